//! Calendar integration
//!
//! Google Calendar v3 REST adapter acting on behalf of an organizer whose
//! access token is stored in the credential repository.

pub mod google;

pub use google::GoogleCalendarProvider;
