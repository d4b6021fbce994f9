//! Outbound notification port interfaces
//!
//! Notifications are fire-and-forget from the core's point of view: callers
//! log failures and never roll back state because of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showup_domain::{Result, StakeAmount, WalletAddress};

/// Invitation e-mail carrying a single-use token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationNotice {
    pub recipient: String,
    pub meeting_id: String,
    pub meeting_title: String,
    pub start_time: DateTime<Utc>,
    pub required_stake: StakeAmount,
    pub token: String,
}

/// Confirmation e-mail sent after a stake is recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeConfirmationNotice {
    pub recipient: String,
    pub meeting_id: String,
    pub meeting_title: String,
    pub start_time: DateTime<Utc>,
    pub amount: StakeAmount,
    pub wallet_address: WalletAddress,
}

/// Trait for sending notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_invitation(&self, notice: &InvitationNotice) -> Result<()>;

    async fn send_stake_confirmation(&self, notice: &StakeConfirmationNotice) -> Result<()>;
}
