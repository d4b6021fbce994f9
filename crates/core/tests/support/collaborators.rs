//! Recording fakes for calendar, e-mail and the external ledger

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use showup_core::{
    CalendarEventRequest, CalendarProvider, ExternalLedger, InvitationNotice, Notifier,
    StakeConfirmationNotice,
};
use showup_domain::{Result as DomainResult, ShowupError, WalletAddress};

/// Records calendar calls; can be told to fail.
#[derive(Default)]
pub struct RecordingCalendar {
    pub created: Mutex<Vec<(String, CalendarEventRequest)>>,
    pub attendees_added: Mutex<Vec<(String, String)>>,
    pub fail_create: AtomicBool,
    pub fail_add_attendee: AtomicBool,
}

#[async_trait]
impl CalendarProvider for RecordingCalendar {
    async fn create_event(
        &self,
        organizer: &str,
        event: &CalendarEventRequest,
    ) -> DomainResult<String> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ShowupError::Network("calendar unavailable".to_string()));
        }
        let mut created = self.created.lock();
        created.push((organizer.to_string(), event.clone()));
        Ok(format!("evt-{}", created.len()))
    }

    async fn add_attendee(
        &self,
        _organizer: &str,
        event_id: &str,
        email: &str,
    ) -> DomainResult<()> {
        if self.fail_add_attendee.load(Ordering::SeqCst) {
            return Err(ShowupError::Network("calendar unavailable".to_string()));
        }
        self.attendees_added.lock().push((event_id.to_string(), email.to_string()));
        Ok(())
    }
}

/// Records every notification attempt; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub invitations: Mutex<Vec<InvitationNotice>>,
    pub confirmations: Mutex<Vec<StakeConfirmationNotice>>,
    pub failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn outcome(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ShowupError::Network("email provider returned 503".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invitation(&self, notice: &InvitationNotice) -> DomainResult<()> {
        self.invitations.lock().push(notice.clone());
        self.outcome()
    }

    async fn send_stake_confirmation(&self, notice: &StakeConfirmationNotice) -> DomainResult<()> {
        self.confirmations.lock().push(notice.clone());
        self.outcome()
    }
}

/// Scripted on-chain state.
#[derive(Default)]
pub struct FakeLedger {
    pub meeting_exists: AtomicBool,
    pub stakers: Mutex<Vec<WalletAddress>>,
}

impl FakeLedger {
    pub fn set(&self, exists: bool, stakers: Vec<WalletAddress>) {
        self.meeting_exists.store(exists, Ordering::SeqCst);
        *self.stakers.lock() = stakers;
    }
}

#[async_trait]
impl ExternalLedger for FakeLedger {
    async fn meeting_exists(&self, _meeting_id: &str) -> DomainResult<bool> {
        Ok(self.meeting_exists.load(Ordering::SeqCst))
    }

    async fn stakers(&self, _meeting_id: &str) -> DomainResult<Vec<WalletAddress>> {
        Ok(self.stakers.lock().clone())
    }

    async fn has_staked(&self, _meeting_id: &str, wallet: &WalletAddress) -> DomainResult<bool> {
        Ok(self.stakers.lock().contains(wallet))
    }
}
