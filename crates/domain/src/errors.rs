//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Showup
///
/// Variants follow the failure taxonomy of the meeting lifecycle:
/// `InvalidInput` is rejected before any side effect, `NotFound` names a
/// missing meeting/token/account, `Conflict` covers duplicate stakes, used or
/// expired tokens and codes, and `Database`/`Network` are upstream failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ShowupError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShowupError {
    /// Stable label suitable for logs and error payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    /// True for failures of the store or an external collaborator.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Network(_))
    }
}

/// Result type alias for Showup operations
pub type Result<T> = std::result::Result<T, ShowupError>;
