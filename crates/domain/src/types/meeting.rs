//! Meeting stake records, lifecycle and time-derived status

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{AttendanceCode, StakeAmount, WalletAddress};
use crate::constants::{CHECK_IN_GRACE_MINUTES, STAKING_CUTOFF_MINUTES};
use crate::errors::{Result, ShowupError};
use crate::impl_domain_status_conversions;

/// Explicit lifecycle of a meeting.
///
/// Transitions are limited to:
/// `pending -> stake_confirmed -> scheduled`, and any non-cancelled state
/// `-> cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingLifecycle {
    Pending,
    StakeConfirmed,
    Scheduled,
    Cancelled,
}

impl_domain_status_conversions!(MeetingLifecycle {
    Pending => "pending",
    StakeConfirmed => "stake_confirmed",
    Scheduled => "scheduled",
    Cancelled => "cancelled",
});

impl MeetingLifecycle {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::StakeConfirmed | Self::Cancelled)
                | (Self::StakeConfirmed, Self::Scheduled | Self::Cancelled)
                | (Self::Scheduled, Self::Cancelled)
        )
    }

    /// Validate a transition, returning the new state.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ShowupError::Conflict(format!("meeting cannot move from {self} to {next}")))
        }
    }

    pub fn is_cancelled(self) -> bool {
        self == Self::Cancelled
    }
}

/// Display status derived from the clock and the meeting timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Upcoming,
    StakingClosed,
    InProgress,
    CheckInPeriod,
    PendingSettlement,
    Settled,
}

impl_domain_status_conversions!(MeetingStatus {
    Upcoming => "upcoming",
    StakingClosed => "staking_closed",
    InProgress => "in_progress",
    CheckInPeriod => "check_in_period",
    PendingSettlement => "pending_settlement",
    Settled => "settled",
});

/// Offsets that turn `start_time`/`end_time` into status bands.
///
/// `check_in_grace` is the single source for both the `check_in_period` band
/// and the attendance-code deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWindows {
    pub staking_cutoff: Duration,
    pub check_in_grace: Duration,
}

impl Default for StatusWindows {
    fn default() -> Self {
        Self {
            staking_cutoff: Duration::minutes(STAKING_CUTOFF_MINUTES),
            check_in_grace: Duration::minutes(CHECK_IN_GRACE_MINUTES),
        }
    }
}

impl StatusWindows {
    pub fn staking_deadline(&self, start_time: DateTime<Utc>) -> DateTime<Utc> {
        start_time - self.staking_cutoff
    }

    pub fn check_in_deadline(&self, end_time: DateTime<Utc>) -> DateTime<Utc> {
        end_time + self.check_in_grace
    }

    /// Ordered cascade; the first matching band wins.
    pub fn derive_status(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        is_settled: bool,
        now: DateTime<Utc>,
    ) -> MeetingStatus {
        let staking_deadline = self.staking_deadline(start_time);
        let check_in_deadline = self.check_in_deadline(end_time);

        if staking_deadline > now {
            MeetingStatus::Upcoming
        } else if start_time > now {
            MeetingStatus::StakingClosed
        } else if end_time > now {
            MeetingStatus::InProgress
        } else if now <= check_in_deadline {
            MeetingStatus::CheckInPeriod
        } else if is_settled {
            MeetingStatus::Settled
        } else {
            MeetingStatus::PendingSettlement
        }
    }
}

/// Reject empty or inverted time ranges.
pub fn validate_time_range(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<()> {
    if end_time <= start_time {
        return Err(ShowupError::InvalidInput("end_time must be after start_time".to_string()));
    }
    Ok(())
}

/// One staker's posting for one meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub wallet_address: WalletAddress,
    pub email: Option<String>,
    pub amount: StakeAmount,
    pub staked_at: DateTime<Utc>,
    pub has_checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub is_refunded: bool,
}

impl StakeRecord {
    pub fn new(
        wallet_address: WalletAddress,
        amount: StakeAmount,
        email: Option<String>,
        staked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_address,
            email,
            amount,
            staked_at,
            has_checked_in: false,
            check_in_time: None,
            is_refunded: false,
        }
    }
}

/// Meeting as proposed by the organizer, before any stake confirms it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMeeting {
    pub meeting_id: String,
    pub organizer: WalletAddress,
    /// Connected calendar account; also owns the address book.
    pub organizer_email: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub required_stake: StakeAmount,
    pub attendees: Vec<String>,
    pub lifecycle: MeetingLifecycle,
    pub created_at: DateTime<Utc>,
}

impl PendingMeeting {
    /// Build the stake ledger entry created by the first stake.
    pub fn initialize(&self) -> Result<MeetingStake> {
        let lifecycle = self.lifecycle.transition(MeetingLifecycle::StakeConfirmed)?;
        Ok(MeetingStake {
            meeting_id: self.meeting_id.clone(),
            event_id: None,
            organizer: self.organizer.clone(),
            title: self.title.clone(),
            required_stake: self.required_stake,
            start_time: self.start_time,
            end_time: self.end_time,
            attendance_code: None,
            is_settled: false,
            lifecycle,
            stakes: Vec::new(),
        })
    }
}

/// Per-meeting stake ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingStake {
    pub meeting_id: String,
    pub event_id: Option<String>,
    pub organizer: WalletAddress,
    pub title: String,
    pub required_stake: StakeAmount,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendance_code: Option<AttendanceCode>,
    pub is_settled: bool,
    pub lifecycle: MeetingLifecycle,
    /// Ordered by `staked_at`.
    pub stakes: Vec<StakeRecord>,
}

impl MeetingStake {
    pub fn status(&self, now: DateTime<Utc>, windows: &StatusWindows) -> MeetingStatus {
        windows.derive_status(self.start_time, self.end_time, self.is_settled, now)
    }

    pub fn check_in_deadline(&self, windows: &StatusWindows) -> DateTime<Utc> {
        windows.check_in_deadline(self.end_time)
    }

    pub fn is_organizer(&self, wallet: &WalletAddress) -> bool {
        &self.organizer == wallet
    }

    pub fn stake_for(&self, wallet: &WalletAddress) -> Option<&StakeRecord> {
        self.stakes.iter().find(|s| &s.wallet_address == wallet)
    }

    pub fn total_staked(&self) -> Result<StakeAmount> {
        StakeAmount::sum(self.stakes.iter().map(|s| s.amount))
    }

    /// Cancelled or settled meetings accept no further writes.
    pub fn is_frozen(&self) -> bool {
        self.is_settled || self.lifecycle.is_cancelled()
    }
}
