//! Port interfaces for meeting and stake persistence
//!
//! Every write that guards an invariant is expressed as a single atomic
//! operation so adapters can implement it with a constraint or a
//! conditional update instead of check-then-act.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showup_domain::{
    AttendanceCode, MeetingLifecycle, MeetingStake, PendingMeeting, Result, StakeRecord,
    WalletAddress,
};

/// Trait for meeting, stake and attendance persistence
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Persist a newly proposed meeting
    async fn insert_pending(&self, meeting: &PendingMeeting) -> Result<()>;

    /// Get a meeting in its proposed form, whatever its lifecycle
    async fn find_pending(&self, meeting_id: &str) -> Result<Option<PendingMeeting>>;

    /// Get the stake ledger of an initialized meeting, stakes included
    async fn find_meeting(&self, meeting_id: &str) -> Result<Option<MeetingStake>>;

    /// Initialize the stake ledger from its pending form.
    ///
    /// Returns `false` when the meeting was already initialized.
    async fn initialize(&self, meeting: &MeetingStake) -> Result<bool>;

    /// Move the lifecycle from `from` to `to` if it is still `from`.
    async fn transition_lifecycle(
        &self,
        meeting_id: &str,
        from: MeetingLifecycle,
        to: MeetingLifecycle,
    ) -> Result<bool>;

    /// Store the calendar event id
    async fn set_event_id(&self, meeting_id: &str, event_id: &str) -> Result<()>;

    /// Append a stake while the meeting is open.
    ///
    /// Fails with `Conflict` when the wallet already staked or the meeting
    /// is settled or cancelled.
    async fn insert_stake(&self, meeting_id: &str, stake: &StakeRecord) -> Result<()>;

    /// Redeem an invitation token and append the stake it brought in as
    /// one write. The stored stake carries the invitation's e-mail.
    ///
    /// Either both happen or neither does: a refused stake leaves the
    /// token unused and records no wallet association.
    async fn insert_invited_stake(
        &self,
        meeting_id: &str,
        stake: &StakeRecord,
        token: &str,
    ) -> Result<StakeRecord>;

    /// Replace the active attendance code
    async fn set_attendance_code(&self, meeting_id: &str, code: &AttendanceCode) -> Result<()>;

    /// Mark a stake as checked in; returns `false` when the wallet has no stake.
    /// Fails with `Conflict` once the meeting is settled or cancelled.
    async fn mark_checked_in(
        &self,
        meeting_id: &str,
        wallet: &WalletAddress,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Flip `is_settled` and refund the listed wallets in one step.
    ///
    /// Returns `false` without touching any stake when the meeting was
    /// already settled.
    async fn mark_settled(&self, meeting_id: &str, refunded: &[WalletAddress]) -> Result<bool>;
}
