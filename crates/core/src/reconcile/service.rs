//! Reconciler - read-only audit of store vs. external ledger
//!
//! Neither side is trusted blindly: the report lists every disagreement and
//! leaves the decision to an operator. Running it twice yields the same
//! discrepancies.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use showup_common::Clock;
use showup_domain::{Discrepancy, ReconciliationReport, Result, WalletAddress};
use tracing::{info, warn};

use crate::ledger_ports::ExternalLedger;
use crate::meetings::meeting_not_found;
use crate::meetings::ports::MeetingRepository;

/// Single-wallet comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeVerification {
    pub meeting_id: String,
    pub wallet_address: WalletAddress,
    pub on_chain: bool,
    pub off_chain: bool,
}

impl StakeVerification {
    pub fn is_consistent(&self) -> bool {
        self.on_chain == self.off_chain
    }
}

/// Compares recorded stakes with the external ledger
pub struct Reconciler {
    meetings: Arc<dyn MeetingRepository>,
    ledger: Arc<dyn ExternalLedger>,
    clock: Arc<dyn Clock>,
}

impl Reconciler {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        ledger: Arc<dyn ExternalLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { meetings, ledger, clock }
    }

    /// Build a report for one meeting; writes nothing.
    pub async fn reconcile(&self, meeting_id: &str) -> Result<ReconciliationReport> {
        let off_chain = self.off_chain_stakers(meeting_id).await?;

        let on_chain_meeting_exists = self.ledger.meeting_exists(meeting_id).await?;
        let on_chain: BTreeSet<WalletAddress> = if on_chain_meeting_exists {
            self.ledger.stakers(meeting_id).await?.into_iter().collect()
        } else {
            BTreeSet::new()
        };

        let mut discrepancies = Vec::new();
        if !on_chain_meeting_exists {
            discrepancies.push(Discrepancy::MeetingMissingOnChain);
        }
        discrepancies.extend(
            off_chain
                .difference(&on_chain)
                .map(|wallet| Discrepancy::StakeMissingOnChain { wallet: wallet.clone() }),
        );
        discrepancies.extend(
            on_chain
                .difference(&off_chain)
                .map(|wallet| Discrepancy::StakeMissingOffChain { wallet: wallet.clone() }),
        );

        for discrepancy in &discrepancies {
            warn!(meeting_id, discrepancy = ?discrepancy, "ledger discrepancy");
        }
        info!(
            meeting_id,
            off_chain = off_chain.len(),
            on_chain = on_chain.len(),
            discrepancies = discrepancies.len(),
            "reconciliation_completed"
        );

        Ok(ReconciliationReport {
            meeting_id: meeting_id.to_string(),
            on_chain_meeting_exists,
            off_chain_stakers: off_chain.into_iter().collect(),
            on_chain_stakers: on_chain.into_iter().collect(),
            discrepancies,
            checked_at: self.clock.now(),
        })
    }

    /// Compare one wallet's stake across both sources.
    pub async fn verify_stake(
        &self,
        meeting_id: &str,
        wallet: &WalletAddress,
    ) -> Result<StakeVerification> {
        let off_chain = self.off_chain_stakers(meeting_id).await?.contains(wallet);
        let on_chain = self.ledger.has_staked(meeting_id, wallet).await?;
        Ok(StakeVerification {
            meeting_id: meeting_id.to_string(),
            wallet_address: wallet.clone(),
            on_chain,
            off_chain,
        })
    }

    async fn off_chain_stakers(&self, meeting_id: &str) -> Result<BTreeSet<WalletAddress>> {
        if self.meetings.find_pending(meeting_id).await?.is_none() {
            return Err(meeting_not_found(meeting_id));
        }
        Ok(self
            .meetings
            .find_meeting(meeting_id)
            .await?
            .map(|meeting| meeting.stakes.into_iter().map(|s| s.wallet_address).collect())
            .unwrap_or_default())
    }
}
