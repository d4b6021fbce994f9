//! Configuration management

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ATTENDANCE_CODE_LENGTH, CHECK_IN_GRACE_MINUTES, INVITATION_TTL_DAYS, STAKING_CUTOFF_MINUTES,
};
use crate::types::StatusWindows;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub calendar: CalendarConfig,
    pub email: EmailConfig,
    pub ledger: LedgerConfig,
    pub staking: StakingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Google Calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Transactional e-mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub base_url: String,
    pub from_address: String,
    /// Public URL of the web app, used to build invitation links.
    pub app_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// External ledger (staking contract) configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
}

/// Staking and attendance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    pub check_in_grace_minutes: i64,
    pub staking_cutoff_minutes: i64,
    pub invitation_ttl_days: i64,
    pub attendance_code_length: usize,
    /// Allow the organizer to settle before the check-in deadline passes.
    pub allow_early_settlement: bool,
    /// Reject stakes posted after the staking cutoff.
    pub enforce_staking_deadline: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8080".to_string() }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "showup.db".to_string(), pool_size: 8 }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.resend.com".to_string(),
            from_address: "Showup <noreply@showup.local>".to_string(),
            app_url: "http://localhost:3000".to_string(),
            api_key: None,
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            check_in_grace_minutes: CHECK_IN_GRACE_MINUTES,
            staking_cutoff_minutes: STAKING_CUTOFF_MINUTES,
            invitation_ttl_days: INVITATION_TTL_DAYS,
            attendance_code_length: ATTENDANCE_CODE_LENGTH,
            allow_early_settlement: false,
            enforce_staking_deadline: true,
        }
    }
}

impl StakingConfig {
    /// Status bands and deadlines derived from this configuration.
    pub fn windows(&self) -> StatusWindows {
        StatusWindows {
            staking_cutoff: Duration::minutes(self.staking_cutoff_minutes),
            check_in_grace: Duration::minutes(self.check_in_grace_minutes),
        }
    }

    pub fn invitation_ttl(&self) -> Duration {
        Duration::days(self.invitation_ttl_days)
    }
}
