//! External ledger port interfaces
//!
//! Read-only view of the staking contract. The core never writes to it.

use async_trait::async_trait;
use showup_domain::{Result, WalletAddress};

/// Trait for querying the on-chain stake ledger
#[async_trait]
pub trait ExternalLedger: Send + Sync {
    /// Whether the contract knows this meeting
    async fn meeting_exists(&self, meeting_id: &str) -> Result<bool>;

    /// Wallets that transferred a stake for this meeting
    async fn stakers(&self, meeting_id: &str) -> Result<Vec<WalletAddress>>;

    /// Whether a single wallet has staked for this meeting
    async fn has_staked(&self, meeting_id: &str, wallet: &WalletAddress) -> Result<bool>;
}
