//! Shared test helpers for `showup-core` integration tests.
//!
//! In-memory fakes mirror the atomic guarantees the SQLite adapters give
//! (unique stakes, conditional lifecycle/settlement/redemption updates), so
//! service tests exercise the same failure paths.

#![allow(dead_code)]

pub mod collaborators;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use showup_common::{Clock, MockClock};
use showup_core::{
    AttendanceService, ContactResolver, InvitationService, MeetingScheduler, Reconciler,
    SettlementService, StakeLedger,
};
use showup_domain::{MeetingLifecycle, PendingMeeting, StakeAmount, StakingConfig, WalletAddress};

pub use collaborators::{FakeLedger, RecordingCalendar, RecordingNotifier};
pub use repositories::{
    InMemoryContactRepository, InMemoryInvitationRepository, InMemoryMeetingRepository,
};

/// Meeting start used by most scenarios ("T").
pub fn meeting_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 16, 0, 0).unwrap()
}

/// Deterministic wallet built from one repeated hex digit.
pub fn wallet(seed: char) -> WalletAddress {
    WalletAddress::parse(&format!("0x{}", seed.to_string().repeat(40))).unwrap()
}

pub fn organizer() -> WalletAddress {
    wallet('a')
}

pub fn stake_amount() -> StakeAmount {
    StakeAmount::parse_ether("0.01").unwrap()
}

/// One-hour pending meeting starting at `start`.
pub fn pending_meeting(meeting_id: &str, start: DateTime<Utc>) -> PendingMeeting {
    PendingMeeting {
        meeting_id: meeting_id.to_string(),
        organizer: organizer(),
        organizer_email: "organizer@example.com".to_string(),
        title: "Weekly sync".to_string(),
        description: Some("Status and blockers".to_string()),
        start_time: start,
        end_time: start + Duration::hours(1),
        required_stake: stake_amount(),
        attendees: vec!["tom.jones@example.com".to_string(), "alice@example.com".to_string()],
        lifecycle: MeetingLifecycle::Pending,
        created_at: start - Duration::days(3),
    }
}

/// Wires every service to shared in-memory fakes and a mock clock.
pub struct Harness {
    pub clock: MockClock,
    pub meetings: Arc<InMemoryMeetingRepository>,
    pub invitations: Arc<InMemoryInvitationRepository>,
    pub contacts: Arc<InMemoryContactRepository>,
    pub calendar: Arc<RecordingCalendar>,
    pub notifier: Arc<RecordingNotifier>,
    pub ledger: Arc<FakeLedger>,
    pub config: StakingConfig,
}

impl Harness {
    pub fn new(now: DateTime<Utc>) -> Self {
        let invitations = InMemoryInvitationRepository::default();
        Self {
            clock: MockClock::at(now),
            meetings: Arc::new(InMemoryMeetingRepository::linked_to(invitations.clone())),
            invitations: Arc::new(invitations),
            contacts: Arc::new(InMemoryContactRepository::default()),
            calendar: Arc::new(RecordingCalendar::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            ledger: Arc::new(FakeLedger::default()),
            config: StakingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StakingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }

    /// Store a pending meeting directly, bypassing proposal validation.
    pub fn seed(&self, meeting: PendingMeeting) -> PendingMeeting {
        self.meetings.seed(meeting.clone());
        meeting
    }

    pub fn stake_ledger(&self) -> StakeLedger {
        StakeLedger::new(
            self.meetings.clone(),
            self.invitations.clone(),
            self.calendar.clone(),
            self.notifier.clone(),
            self.clock(),
            self.config.clone(),
        )
    }

    pub fn attendance(&self) -> AttendanceService {
        AttendanceService::new(self.meetings.clone(), self.clock(), self.config.clone())
    }

    pub fn settlement(&self) -> SettlementService {
        SettlementService::new(self.meetings.clone(), self.clock(), self.config.clone())
    }

    pub fn invitation_service(&self) -> InvitationService {
        InvitationService::new(
            self.invitations.clone(),
            self.meetings.clone(),
            self.notifier.clone(),
            self.clock(),
            self.config.clone(),
        )
    }

    pub fn scheduler(&self) -> MeetingScheduler {
        MeetingScheduler::new(
            self.meetings.clone(),
            Arc::new(ContactResolver::new(self.contacts.clone())),
            self.calendar.clone(),
            Arc::new(self.invitation_service()),
            self.clock(),
            self.config.clone(),
        )
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.meetings.clone(), self.ledger.clone(), self.clock())
    }
}
