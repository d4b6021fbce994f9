//! Settlement - partitions stakes into refunded and forfeited

use std::sync::Arc;

use showup_common::Clock;
use showup_domain::{
    MeetingStake, Result, SettlementSummary, ShowupError, StakeAmount, StakeRecord, StakingConfig,
};
use tracing::{info, warn};

use super::load_meeting;
use super::ports::MeetingRepository;

/// Settles meetings once check-in has closed
pub struct SettlementService {
    meetings: Arc<dyn MeetingRepository>,
    clock: Arc<dyn Clock>,
    config: StakingConfig,
}

impl SettlementService {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        clock: Arc<dyn Clock>,
        config: StakingConfig,
    ) -> Self {
        Self { meetings, clock, config }
    }

    /// Settle a meeting.
    ///
    /// Idempotent: once settled, further calls return the stored partition
    /// with `newly_settled == false` and write nothing.
    pub async fn settle(&self, meeting_id: &str) -> Result<SettlementSummary> {
        let meeting = load_meeting(self.meetings.as_ref(), meeting_id).await?;
        if meeting.is_settled {
            return settled_summary(&meeting);
        }
        if meeting.lifecycle.is_cancelled() {
            return Err(ShowupError::Conflict(format!("meeting {meeting_id} was cancelled")));
        }

        let deadline = meeting.check_in_deadline(&self.config.windows());
        if !self.config.allow_early_settlement && self.clock.now() <= deadline {
            return Err(ShowupError::Conflict(format!(
                "check-in for meeting {meeting_id} is open until {deadline}"
            )));
        }

        let summary = partition(meeting_id, &meeting.stakes, |s| s.has_checked_in, true)?;
        if !self.meetings.mark_settled(meeting_id, &summary.refunded_wallets).await? {
            warn!(meeting_id, "meeting was settled concurrently");
            let meeting = load_meeting(self.meetings.as_ref(), meeting_id).await?;
            return settled_summary(&meeting);
        }

        info!(
            meeting_id,
            refunded_total = %summary.refunded_total,
            forfeited_total = %summary.forfeited_total,
            refunded = summary.refunded_wallets.len(),
            forfeited = summary.forfeited_wallets.len(),
            "meeting_settled"
        );
        Ok(summary)
    }
}

/// Summary of an already-settled meeting, read from the stored refund flags.
fn settled_summary(meeting: &MeetingStake) -> Result<SettlementSummary> {
    partition(&meeting.meeting_id, &meeting.stakes, |s| s.is_refunded, false)
}

/// Split stakes by `refunded`, summing both sides.
pub fn partition<F>(
    meeting_id: &str,
    stakes: &[StakeRecord],
    refunded: F,
    newly_settled: bool,
) -> Result<SettlementSummary>
where
    F: Fn(&StakeRecord) -> bool,
{
    let (refunds, forfeits): (Vec<&StakeRecord>, Vec<&StakeRecord>) =
        stakes.iter().partition(|s| refunded(*s));

    Ok(SettlementSummary {
        meeting_id: meeting_id.to_string(),
        refunded_total: StakeAmount::sum(refunds.iter().map(|s| s.amount))?,
        forfeited_total: StakeAmount::sum(forfeits.iter().map(|s| s.amount))?,
        refunded_wallets: refunds.iter().map(|s| s.wallet_address.clone()).collect(),
        forfeited_wallets: forfeits.iter().map(|s| s.wallet_address.clone()).collect(),
        newly_settled,
    })
}
