//! Google Calendar provider implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use showup_common::time::Clock;
use showup_core::{CalendarCredentialRepository, CalendarEventRequest, CalendarProvider};
use showup_domain::{Result, ShowupError};
use tracing::{debug, info};
use url::Url;

use crate::http::HttpClient;

const PRIMARY_CALENDAR: &str = "primary";

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    http: HttpClient,
    base_url: String,
    credentials: Arc<dyn CalendarCredentialRepository>,
    clock: Arc<dyn Clock>,
}

impl GoogleCalendarProvider {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        credentials: Arc<dyn CalendarCredentialRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { http, base_url: base_url.into(), credentials, clock }
    }

    async fn access_token(&self, organizer: &str) -> Result<String> {
        let credential = self.credentials.get_credential(organizer).await?.ok_or_else(|| {
            ShowupError::Auth(format!("no calendar credential stored for {organizer}"))
        })?;

        if credential.expires_at.is_some_and(|expires_at| expires_at <= self.clock.now()) {
            return Err(ShowupError::Auth(format!(
                "calendar credential for {organizer} has expired"
            )));
        }
        Ok(credential.access_token)
    }

    /// `{base}/calendars/primary/events[/{event_id}]` with path escaping.
    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ShowupError::Config(format!("invalid calendar base url: {e}")))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ShowupError::Config("calendar base url cannot carry a path".to_string())
            })?;
            segments.pop_if_empty().extend(["calendars", PRIMARY_CALENDAR, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        url.query_pairs_mut().append_pair("sendUpdates", "all");
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn create_event(&self, organizer: &str, event: &CalendarEventRequest) -> Result<String> {
        let token = self.access_token(organizer).await?;
        let body = GoogleEventInsert::from(event);

        let request =
            self.http.request(Method::POST, self.events_url(None)?).bearer_auth(token).json(&body);
        let created: GoogleEvent = self.http.send_json(request, "create calendar event").await?;

        info!(event_id = %created.id, attendees = event.attendees.len(), "calendar event created");
        Ok(created.id)
    }

    async fn add_attendee(&self, organizer: &str, event_id: &str, email: &str) -> Result<()> {
        let token = self.access_token(organizer).await?;
        let url = self.events_url(Some(event_id))?;

        let current: GoogleEvent = self
            .http
            .send_json(
                self.http.request(Method::GET, url.clone()).bearer_auth(&token),
                "fetch calendar event",
            )
            .await?;

        let mut attendees = current.attendees.unwrap_or_default();
        let already_invited = attendees.iter().any(|attendee| {
            attendee
                .get("email")
                .and_then(Value::as_str)
                .is_some_and(|existing| existing.eq_ignore_ascii_case(email))
        });
        if already_invited {
            debug!(event_id, email, "attendee already on calendar event");
            return Ok(());
        }

        attendees.push(serde_json::json!({ "email": email }));
        let request = self
            .http
            .request(Method::PATCH, url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "attendees": attendees }));
        self.http.expect_success(request, "add calendar attendee").await?;

        info!(event_id, email, "attendee added to calendar event");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GoogleEventInsert {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
    attendees: Vec<EventAttendee>,
}

impl From<&CalendarEventRequest> for GoogleEventInsert {
    fn from(event: &CalendarEventRequest) -> Self {
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: EventDateTime::utc(event.start_time),
            end: EventDateTime::utc(event.end_time),
            attendees: event
                .attendees
                .iter()
                .map(|email| EventAttendee { email: email.clone() })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: &'static str,
}

impl EventDateTime {
    fn utc(at: DateTime<Utc>) -> Self {
        Self { date_time: at.to_rfc3339(), time_zone: "UTC" }
    }
}

#[derive(Debug, Serialize)]
struct EventAttendee {
    email: String,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    attendees: Option<Vec<Value>>,
}
