//! Attendance flow - code generation and check-in

use std::sync::Arc;

use showup_common::{generate_attendance_code, Clock};
use showup_domain::{
    AttendanceCode, CheckInOutcome, MeetingStake, Result, ShowupError, StakingConfig,
    WalletAddress,
};
use tracing::info;

use super::load_meeting;
use super::ports::MeetingRepository;

/// Issues attendance codes and checks stakers in
pub struct AttendanceService {
    meetings: Arc<dyn MeetingRepository>,
    clock: Arc<dyn Clock>,
    config: StakingConfig,
}

impl AttendanceService {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        clock: Arc<dyn Clock>,
        config: StakingConfig,
    ) -> Self {
        Self { meetings, clock, config }
    }

    /// Generate a new code, replacing any previous one. Organizer only.
    pub async fn generate_code(
        &self,
        meeting_id: &str,
        requested_by: &WalletAddress,
    ) -> Result<AttendanceCode> {
        let meeting = load_meeting(self.meetings.as_ref(), meeting_id).await?;
        if !meeting.is_organizer(requested_by) {
            return Err(ShowupError::Auth(
                "only the organizer can generate an attendance code".to_string(),
            ));
        }
        ensure_open(&meeting)?;

        let now = self.clock.now();
        let deadline = meeting.check_in_deadline(&self.config.windows());
        if now > deadline {
            return Err(ShowupError::Conflict(format!("check-in closed at {deadline}")));
        }

        let code = AttendanceCode {
            code: generate_attendance_code(self.config.attendance_code_length),
            generated_at: now,
        };
        self.meetings.set_attendance_code(meeting_id, &code).await?;

        let replaced = meeting.attendance_code.is_some();
        info!(meeting_id, replaced, "attendance_code_generated");
        Ok(code)
    }

    /// Validate a submitted code and mark the wallet's stake as checked in.
    ///
    /// A valid code from a wallet without a stake succeeds with
    /// [`CheckInOutcome::NotStaked`] and writes nothing.
    pub async fn submit_code(
        &self,
        meeting_id: &str,
        code: &str,
        wallet: &WalletAddress,
    ) -> Result<CheckInOutcome> {
        let meeting = load_meeting(self.meetings.as_ref(), meeting_id).await?;
        ensure_open(&meeting)?;

        let active = meeting.attendance_code.as_ref().ok_or_else(|| {
            ShowupError::NotFound(format!("no attendance code for meeting {meeting_id}"))
        })?;

        let now = self.clock.now();
        let deadline = meeting.check_in_deadline(&self.config.windows());
        if now > deadline {
            return Err(ShowupError::Conflict(format!("check-in closed at {deadline}")));
        }

        if !active.matches(code) {
            return Err(ShowupError::InvalidInput("attendance code does not match".to_string()));
        }

        if self.meetings.mark_checked_in(meeting_id, wallet, now).await? {
            info!(meeting_id, wallet = %wallet, "checked_in");
            Ok(CheckInOutcome::CheckedIn { wallet_address: wallet.clone(), check_in_time: now })
        } else {
            info!(meeting_id, wallet = %wallet, "valid code from wallet without a stake");
            Ok(CheckInOutcome::NotStaked { wallet_address: wallet.clone() })
        }
    }
}

fn ensure_open(meeting: &MeetingStake) -> Result<()> {
    if meeting.is_settled {
        return Err(ShowupError::Conflict(format!(
            "meeting {} is already settled",
            meeting.meeting_id
        )));
    }
    if meeting.lifecycle.is_cancelled() {
        return Err(ShowupError::Conflict(format!("meeting {} was cancelled", meeting.meeting_id)));
    }
    Ok(())
}
