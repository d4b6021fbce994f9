#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use showup_common::testing::{MockClock, TempDir};
use showup_core::{
    CalendarEventRequest, CalendarProvider, ExternalLedger, InvitationNotice, Notifier,
    StakeConfirmationNotice,
};
use showup_domain::{Config, Result, WalletAddress};
use showup_infra::DbManager;
use showup_lib::{router, AppContext, Integrations};
use tower::ServiceExt;

pub const ORGANIZER_EMAIL: &str = "organizer@example.com";

/// Calendar fake that records created events and added attendees.
#[derive(Default)]
pub struct RecordingCalendar {
    pub events: Mutex<Vec<CalendarEventRequest>>,
    pub added: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl CalendarProvider for RecordingCalendar {
    async fn create_event(&self, _organizer: &str, event: &CalendarEventRequest) -> Result<String> {
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(format!("evt-{}", events.len()))
    }

    async fn add_attendee(&self, _organizer: &str, event_id: &str, email: &str) -> Result<()> {
        self.added.lock().unwrap().push((event_id.to_string(), email.to_string()));
        Ok(())
    }
}

/// Notifier fake that keeps every recipient.
#[derive(Default)]
pub struct RecordingNotifier {
    pub invitations: Mutex<Vec<InvitationNotice>>,
    pub confirmations: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invitation(&self, notice: &InvitationNotice) -> Result<()> {
        self.invitations.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn send_stake_confirmation(&self, notice: &StakeConfirmationNotice) -> Result<()> {
        self.confirmations.lock().unwrap().push(notice.recipient.clone());
        Ok(())
    }
}

/// Ledger fake with a fixed view of the contract.
#[derive(Default)]
pub struct FakeLedger {
    pub meeting_exists: Mutex<bool>,
    pub stakers: Mutex<Vec<WalletAddress>>,
}

#[async_trait]
impl ExternalLedger for FakeLedger {
    async fn meeting_exists(&self, _meeting_id: &str) -> Result<bool> {
        Ok(*self.meeting_exists.lock().unwrap())
    }

    async fn stakers(&self, _meeting_id: &str) -> Result<Vec<WalletAddress>> {
        Ok(self.stakers.lock().unwrap().clone())
    }

    async fn has_staked(&self, _meeting_id: &str, wallet: &WalletAddress) -> Result<bool> {
        Ok(self.stakers.lock().unwrap().contains(wallet))
    }
}

/// Router over a temporary database with recording fakes.
pub struct TestApp {
    pub router: Router,
    pub clock: MockClock,
    pub calendar: Arc<RecordingCalendar>,
    pub notifier: Arc<RecordingNotifier>,
    pub ledger: Arc<FakeLedger>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new("api-test").expect("temp dir should be created");
        let db = DbManager::new(temp_dir.path().join("showup.db"), 4).expect("db manager");
        db.run_migrations().expect("schema migrations should apply");

        let clock = MockClock::at(now());
        let calendar = Arc::new(RecordingCalendar::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ledger = Arc::new(FakeLedger::default());

        let integrations = Integrations {
            calendar: calendar.clone(),
            notifier: notifier.clone(),
            ledger: ledger.clone(),
            clock: Arc::new(clock.clone()),
        };
        let ctx = AppContext::with_integrations(Config::default(), Arc::new(db), integrations);

        Self {
            router: router(Arc::new(ctx)),
            clock,
            calendar,
            notifier,
            ledger,
            _temp_dir: temp_dir,
        }
    }

    /// Send one request and decode the JSON response (or `Null` when empty).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(body)).await
    }

    /// Propose a meeting with one e-mail attendee and return its id.
    pub async fn propose_meeting(&self) -> String {
        let (status, body) = self.post("/meetings", proposal(&["tom.jones@example.com"])).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["meeting"]["meeting_id"].as_str().unwrap().to_string()
    }

    pub async fn stake(&self, meeting_id: &str, seed: char) -> (StatusCode, Value) {
        self.post(
            &format!("/meetings/{meeting_id}/stakes"),
            json!({ "wallet_address": wallet(seed), "amount": "0.01" }),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock start for every test: six hours before the meeting.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap()
}

pub fn meeting_start() -> DateTime<Utc> {
    now() + Duration::hours(6)
}

pub fn wallet(seed: char) -> String {
    format!("0x{}", seed.to_string().repeat(40))
}

/// Proposal body organized by wallet `a`.
pub fn proposal(attendees: &[&str]) -> Value {
    json!({
        "organizer": wallet('a'),
        "organizer_email": ORGANIZER_EMAIL,
        "title": "Weekly sync",
        "description": "Agenda in the doc",
        "start_time": meeting_start(),
        "end_time": meeting_start() + Duration::hours(1),
        "attendees": attendees,
        "required_stake": "0.01"
    })
}
