//! # Showup Domain
//!
//! Business domain types and models for Showup.
//!
//! This crate contains:
//! - Meeting stake, stake record, invitation and contact types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants, status derivation and the lifecycle transition table
//!
//! ## Architecture
//! - No dependencies on other Showup crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
