//! Health report types for the `/health` route
//!
//! Only the store is required for the service to be considered healthy.
//! Optional integrations (e-mail, external ledger) are reported as
//! `disabled` when unconfigured and never fail the overall check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health of the service
///
/// # Example
/// ```
/// use chrono::Utc;
/// use showup_lib::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_components(
///     vec![ComponentHealth::up("database"), ComponentHealth::disabled("email")],
///     Utc::now(),
/// );
/// assert!(status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub version: String,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    /// Healthy when no component is down.
    pub fn from_components(components: Vec<ComponentHealth>, checked_at: DateTime<Utc>) -> Self {
        let is_healthy = components.iter().all(|c| c.state != ComponentState::Down);
        Self {
            is_healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            components,
            checked_at,
        }
    }
}

/// State of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Up,
    Down,
    Disabled,
}

/// Health of an individual component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component identifier (e.g. "database", "ledger")
    pub name: String,
    pub state: ComponentState,
    /// Failure detail when the component is down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn up(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: ComponentState::Up, message: None }
    }

    pub fn down(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), state: ComponentState::Down, message: Some(message.into()) }
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: ComponentState::Disabled, message: None }
    }

    /// `up` or `disabled` depending on whether the integration is configured.
    pub fn optional(name: impl Into<String>, configured: bool) -> Self {
        if configured {
            Self::up(name)
        } else {
            Self::disabled(name)
        }
    }
}
