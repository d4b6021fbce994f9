//! # Showup Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite behind an r2d2 pool)
//! - HTTP client with retry and backoff
//! - External service integrations (Google Calendar, e-mail API, staking
//!   contract)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `showup-core`
//! - Depends on `showup-domain` and `showup-core`
//! - Contains all "impure" code (I/O, network, chain reads)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use integrations::*;
