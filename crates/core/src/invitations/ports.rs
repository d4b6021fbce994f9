//! Port interfaces for invitation tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showup_domain::{InvitationToken, Result, WalletAddress, WalletEmailAssociation};

/// Trait for invitation token persistence
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persist a freshly issued token
    async fn insert_invitation(&self, invitation: &InvitationToken) -> Result<()>;

    /// Get a token by value
    async fn find_invitation(&self, token: &str) -> Result<Option<InvitationToken>>;

    /// All tokens issued for a meeting
    async fn list_for_meeting(&self, meeting_id: &str) -> Result<Vec<InvitationToken>>;

    /// Redeem a token and record the wallet/e-mail association atomically.
    ///
    /// Fails with `NotFound` for unknown tokens and `Conflict` for used or
    /// expired ones; in both failure cases nothing is written.
    async fn redeem(
        &self,
        token: &str,
        wallet: &WalletAddress,
        from_stake: bool,
        now: DateTime<Utc>,
    ) -> Result<WalletEmailAssociation>;

    /// Associations recorded for a wallet
    async fn associations_for_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<WalletEmailAssociation>>;
}
