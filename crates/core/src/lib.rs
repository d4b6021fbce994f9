//! # Showup Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the store, calendar, e-mail and
//!   external ledger
//! - The meeting staking lifecycle: stakes, attendance, settlement,
//!   scheduling
//! - Contact resolution and on-chain reconciliation
//!
//! ## Architecture Principles
//! - Only depends on `showup-common` and `showup-domain`
//! - No database, HTTP, or chain client code
//! - All external dependencies via traits
//! - Time is read through an injected `Clock`

pub mod contacts;
pub mod invitations;
pub mod meetings;
pub mod reconcile;

// Integration ports
pub mod calendar_ports;
pub mod ledger_ports;
pub mod notification_ports;

// Re-export specific items to avoid ambiguity
pub use calendar_ports::{
    CalendarCredential, CalendarCredentialRepository, CalendarEventRequest, CalendarProvider,
};
pub use contacts::ports::ContactRepository;
pub use contacts::ContactResolver;
pub use invitations::ports::InvitationRepository;
pub use invitations::InvitationService;
pub use ledger_ports::ExternalLedger;
pub use meetings::ports::MeetingRepository;
pub use meetings::{
    AttendanceService, MeetingOverview, MeetingScheduler, PostStakeRequest, ProposalOutcome,
    ProposeMeetingRequest, SettlementService, StakeLedger, StakeReceipt,
};
pub use notification_ports::{InvitationNotice, Notifier, StakeConfirmationNotice};
pub use reconcile::{Reconciler, StakeVerification};
