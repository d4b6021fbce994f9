//! Testing utilities shared by integration tests across the workspace.
//!
//! - **[`temp`]**: temporary directory that deletes itself on drop
//! - clocks are re-exported from [`crate::time`] so tests only need one import

pub mod temp;

pub use temp::TempDir;

pub use crate::time::{Clock, MockClock, SystemClock};
