//! External service integrations

pub mod calendar;
pub mod email;
pub mod ledger;

pub use calendar::GoogleCalendarProvider;
pub use email::{EmailNotifier, LoggingNotifier};
pub use ledger::{ContractLedger, UnconfiguredLedger};
