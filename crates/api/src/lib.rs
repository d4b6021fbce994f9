//! # Showup API
//!
//! HTTP application layer - routes and main entry point.
//!
//! This crate contains:
//! - axum routes (HTTP → core services bridge)
//! - Application context (dependency injection)
//! - Error → HTTP status mapping
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core` and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes every meeting, stake and invitation operation as JSON routes

pub mod commands;
pub mod context;
pub mod error;
pub mod utils;

// Re-export for convenience
pub use commands::router;
pub use context::*;
pub use error::{ApiError, ApiJson, ApiResult, ErrorBody};
