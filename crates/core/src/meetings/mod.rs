//! Meeting staking lifecycle: stakes, attendance, settlement and scheduling

pub mod attendance;
pub mod ledger;
pub mod ports;
pub mod scheduler;
pub mod settlement;

pub use attendance::AttendanceService;
pub use ledger::{PostStakeRequest, StakeLedger, StakeReceipt};
pub use scheduler::{MeetingOverview, MeetingScheduler, ProposalOutcome, ProposeMeetingRequest};
pub use settlement::SettlementService;

use showup_domain::{MeetingStake, Result, ShowupError};

use self::ports::MeetingRepository;

/// Load an initialized meeting, distinguishing "unknown" from "not yet staked".
pub(crate) async fn load_meeting(
    repository: &dyn MeetingRepository,
    meeting_id: &str,
) -> Result<MeetingStake> {
    if let Some(meeting) = repository.find_meeting(meeting_id).await? {
        return Ok(meeting);
    }
    match repository.find_pending(meeting_id).await? {
        Some(_) => Err(ShowupError::Conflict(format!(
            "meeting {meeting_id} has no stakes yet"
        ))),
        None => Err(meeting_not_found(meeting_id)),
    }
}

pub(crate) fn meeting_not_found(meeting_id: &str) -> ShowupError {
    ShowupError::NotFound(format!("meeting {meeting_id}"))
}
