//! On-chain/off-chain reconciliation reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WalletAddress;

/// One disagreement between the store and the external ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    MeetingMissingOnChain,
    /// Recorded in the store, no transfer on chain.
    StakeMissingOnChain { wallet: WalletAddress },
    /// Transferred on chain, never recorded in the store.
    StakeMissingOffChain { wallet: WalletAddress },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub meeting_id: String,
    pub on_chain_meeting_exists: bool,
    pub off_chain_stakers: Vec<WalletAddress>,
    pub on_chain_stakers: Vec<WalletAddress>,
    pub discrepancies: Vec<Discrepancy>,
    pub checked_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}
