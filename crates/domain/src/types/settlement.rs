//! Settlement results

use serde::{Deserialize, Serialize};

use super::{StakeAmount, WalletAddress};

/// Refund/forfeit partition of a meeting's stakes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub meeting_id: String,
    pub refunded_total: StakeAmount,
    pub forfeited_total: StakeAmount,
    pub refunded_wallets: Vec<WalletAddress>,
    pub forfeited_wallets: Vec<WalletAddress>,
    /// False when the meeting had already been settled by an earlier call.
    pub newly_settled: bool,
}
