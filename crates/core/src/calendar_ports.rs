//! Calendar integration port interfaces
//!
//! The core only needs two calendar operations: create an event and get its
//! id back, and add one attendee to an existing event. Both act on behalf of
//! an organizer whose credential is stored separately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showup_domain::Result;

/// Event to create in the organizer's calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRequest {
    pub summary: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendees: Vec<String>,
}

/// Stored calendar credential for one organizer account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCredential {
    pub account_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Trait for calendar provider operations
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Create an event and return the provider's event id
    async fn create_event(&self, organizer: &str, event: &CalendarEventRequest) -> Result<String>;

    /// Add an attendee to an existing event
    async fn add_attendee(&self, organizer: &str, event_id: &str, email: &str) -> Result<()>;
}

/// Trait for calendar credential persistence
#[async_trait]
pub trait CalendarCredentialRepository: Send + Sync {
    /// Get the credential for an organizer account
    async fn get_credential(&self, account_id: &str) -> Result<Option<CalendarCredential>>;

    /// Insert or replace the credential for an organizer account
    async fn save_credential(&self, credential: &CalendarCredential) -> Result<()>;
}
