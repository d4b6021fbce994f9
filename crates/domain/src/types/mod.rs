//! Domain types and models

pub mod amount;
pub mod attendance;
pub mod contact;
pub mod invitation;
pub mod meeting;
pub mod reconcile;
pub mod settlement;
pub mod wallet;

pub use amount::StakeAmount;
pub use attendance::{AttendanceCode, CheckInOutcome};
pub use contact::{Contact, ContactCandidate, ContactResolution, MatchRule};
pub use invitation::{InvitationToken, WalletEmailAssociation};
pub use meeting::{
    validate_time_range, MeetingLifecycle, MeetingStake, MeetingStatus, PendingMeeting,
    StakeRecord, StatusWindows,
};
pub use reconcile::{Discrepancy, ReconciliationReport};
pub use settlement::SettlementSummary;
pub use wallet::WalletAddress;
