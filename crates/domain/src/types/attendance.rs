//! Attendance codes and check-in outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WalletAddress;

/// The single active attendance code of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCode {
    pub code: String,
    pub generated_at: DateTime<Utc>,
}

impl AttendanceCode {
    /// Codes are compared case-insensitively after trimming.
    pub fn matches(&self, submitted: &str) -> bool {
        self.code.eq_ignore_ascii_case(submitted.trim())
    }
}

/// Result of a valid code submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    CheckedIn { wallet_address: WalletAddress, check_in_time: DateTime<Utc> },
    /// The code was valid but the wallet never staked; nothing was written.
    NotStaked { wallet_address: WalletAddress },
}
