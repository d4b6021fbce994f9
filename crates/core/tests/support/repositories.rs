//! In-memory repository fakes

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use showup_core::{ContactRepository, InvitationRepository, MeetingRepository};
use showup_domain::{
    AttendanceCode, Contact, InvitationToken, MeetingLifecycle, MeetingStake, PendingMeeting,
    Result as DomainResult, ShowupError, StakeRecord, WalletAddress, WalletEmailAssociation,
};

struct MeetingRow {
    pending: PendingMeeting,
    stake: Option<MeetingStake>,
}

/// In-memory `MeetingRepository` keyed by meeting id.
///
/// Invited stakes redeem against the linked invitation store, mirroring the
/// single transaction the SQLite adapter uses.
#[derive(Default, Clone)]
pub struct InMemoryMeetingRepository {
    rows: Arc<Mutex<HashMap<String, MeetingRow>>>,
    invitations: InMemoryInvitationRepository,
}

impl InMemoryMeetingRepository {
    pub fn linked_to(invitations: InMemoryInvitationRepository) -> Self {
        Self { rows: Arc::default(), invitations }
    }

    pub fn seed(&self, meeting: PendingMeeting) {
        self.rows
            .lock()
            .insert(meeting.meeting_id.clone(), MeetingRow { pending: meeting, stake: None });
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn lifecycle(&self, meeting_id: &str) -> Option<MeetingLifecycle> {
        self.rows.lock().get(meeting_id).map(|row| row.pending.lifecycle)
    }

    /// Initialized meeting as currently stored; panics if absent.
    pub fn meeting(&self, meeting_id: &str) -> MeetingStake {
        let rows = self.rows.lock();
        let row = rows.get(meeting_id).expect("meeting row");
        let mut stake = row.stake.clone().expect("initialized meeting");
        stake.lifecycle = row.pending.lifecycle;
        stake
    }

    fn with_stake<T>(
        &self,
        meeting_id: &str,
        f: impl FnOnce(&mut MeetingStake) -> T,
    ) -> DomainResult<T> {
        let mut rows = self.rows.lock();
        let stake = rows
            .get_mut(meeting_id)
            .and_then(|row| row.stake.as_mut())
            .ok_or_else(|| ShowupError::NotFound(format!("meeting {meeting_id}")))?;
        Ok(f(stake))
    }

    /// Like `with_stake`, refusing settled or cancelled meetings.
    fn with_open_stake<T>(
        &self,
        meeting_id: &str,
        f: impl FnOnce(&mut MeetingStake) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut rows = self.rows.lock();
        let Some(MeetingRow { pending, stake: Some(stake) }) = rows.get_mut(meeting_id) else {
            return Err(ShowupError::NotFound(format!("meeting {meeting_id}")));
        };
        let lifecycle = pending.lifecycle;
        if stake.is_settled || lifecycle.is_cancelled() {
            return Err(ShowupError::Conflict(format!("meeting {meeting_id} is closed")));
        }
        f(stake)
    }
}

fn ensure_new_staker(stake: &MeetingStake, wallet: &WalletAddress) -> DomainResult<()> {
    match stake.stake_for(wallet) {
        Some(_) => Err(ShowupError::Conflict(format!("wallet {wallet} has already staked"))),
        None => Ok(()),
    }
}

#[async_trait]
impl MeetingRepository for InMemoryMeetingRepository {
    async fn insert_pending(&self, meeting: &PendingMeeting) -> DomainResult<()> {
        let mut rows = self.rows.lock();
        if rows.contains_key(&meeting.meeting_id) {
            return Err(ShowupError::Conflict(format!("meeting {}", meeting.meeting_id)));
        }
        rows.insert(
            meeting.meeting_id.clone(),
            MeetingRow { pending: meeting.clone(), stake: None },
        );
        Ok(())
    }

    async fn find_pending(&self, meeting_id: &str) -> DomainResult<Option<PendingMeeting>> {
        Ok(self.rows.lock().get(meeting_id).map(|row| row.pending.clone()))
    }

    async fn find_meeting(&self, meeting_id: &str) -> DomainResult<Option<MeetingStake>> {
        Ok(self.rows.lock().get(meeting_id).and_then(|row| {
            row.stake.clone().map(|mut stake| {
                stake.lifecycle = row.pending.lifecycle;
                stake
            })
        }))
    }

    async fn initialize(&self, meeting: &MeetingStake) -> DomainResult<bool> {
        let mut rows = self.rows.lock();
        let row = rows
            .get_mut(&meeting.meeting_id)
            .ok_or_else(|| ShowupError::NotFound(format!("meeting {}", meeting.meeting_id)))?;
        if row.stake.is_some() || row.pending.lifecycle != MeetingLifecycle::Pending {
            return Ok(false);
        }
        row.pending.lifecycle = meeting.lifecycle;
        row.stake = Some(meeting.clone());
        Ok(true)
    }

    async fn transition_lifecycle(
        &self,
        meeting_id: &str,
        from: MeetingLifecycle,
        to: MeetingLifecycle,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(meeting_id) {
            Some(row)
                if row.pending.lifecycle == from
                    && !row.stake.as_ref().is_some_and(|stake| stake.is_settled) =>
            {
                row.pending.lifecycle = to;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(ShowupError::NotFound(format!("meeting {meeting_id}"))),
        }
    }

    async fn set_event_id(&self, meeting_id: &str, event_id: &str) -> DomainResult<()> {
        self.with_stake(meeting_id, |stake| stake.event_id = Some(event_id.to_string()))
    }

    async fn insert_stake(&self, meeting_id: &str, record: &StakeRecord) -> DomainResult<()> {
        self.with_open_stake(meeting_id, |stake| {
            ensure_new_staker(stake, &record.wallet_address)?;
            stake.stakes.push(record.clone());
            Ok(())
        })
    }

    async fn insert_invited_stake(
        &self,
        meeting_id: &str,
        record: &StakeRecord,
        token: &str,
    ) -> DomainResult<StakeRecord> {
        self.with_open_stake(meeting_id, |stake| {
            ensure_new_staker(stake, &record.wallet_address)?;
            let association = self.invitations.claim(
                token,
                &record.wallet_address,
                true,
                record.staked_at,
                Some(meeting_id),
            )?;
            let record = StakeRecord { email: Some(association.email), ..record.clone() };
            stake.stakes.push(record.clone());
            Ok(record)
        })
    }

    async fn set_attendance_code(
        &self,
        meeting_id: &str,
        code: &AttendanceCode,
    ) -> DomainResult<()> {
        self.with_stake(meeting_id, |stake| stake.attendance_code = Some(code.clone()))
    }

    async fn mark_checked_in(
        &self,
        meeting_id: &str,
        wallet: &WalletAddress,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.with_open_stake(meeting_id, |stake| {
            Ok(match stake.stakes.iter_mut().find(|s| &s.wallet_address == wallet) {
                Some(record) => {
                    record.has_checked_in = true;
                    record.check_in_time = Some(at);
                    true
                }
                None => false,
            })
        })
    }

    async fn mark_settled(
        &self,
        meeting_id: &str,
        refunded: &[WalletAddress],
    ) -> DomainResult<bool> {
        self.with_stake(meeting_id, |stake| {
            if stake.is_settled {
                return false;
            }
            stake.is_settled = true;
            for record in &mut stake.stakes {
                if refunded.contains(&record.wallet_address) {
                    record.is_refunded = true;
                }
            }
            true
        })
    }
}

/// In-memory `InvitationRepository`.
#[derive(Default, Clone)]
pub struct InMemoryInvitationRepository {
    tokens: Arc<Mutex<HashMap<String, InvitationToken>>>,
    associations: Arc<Mutex<Vec<WalletEmailAssociation>>>,
}

impl InMemoryInvitationRepository {
    pub fn association_count(&self) -> usize {
        self.associations.lock().len()
    }

    fn claim(
        &self,
        token: &str,
        wallet: &WalletAddress,
        from_stake: bool,
        now: DateTime<Utc>,
        meeting_id: Option<&str>,
    ) -> DomainResult<WalletEmailAssociation> {
        let mut tokens = self.tokens.lock();
        let invitation = tokens
            .get_mut(token)
            .ok_or_else(|| ShowupError::NotFound("invitation token".to_string()))?;
        if meeting_id.is_some_and(|id| id != invitation.meeting_id) {
            return Err(ShowupError::InvalidInput("token for another meeting".to_string()));
        }
        if invitation.used {
            return Err(ShowupError::Conflict("invitation already used".to_string()));
        }
        if invitation.is_expired(now) {
            return Err(ShowupError::Conflict("invitation expired".to_string()));
        }

        invitation.used = true;
        invitation.used_by_wallet = Some(wallet.clone());
        invitation.used_at = Some(now);

        let association = WalletEmailAssociation {
            wallet_address: wallet.clone(),
            email: invitation.email.clone(),
            meeting_id: invitation.meeting_id.clone(),
            from_stake,
            created_at: now,
        };
        self.associations.lock().push(association.clone());
        Ok(association)
    }
}

#[async_trait]
impl InvitationRepository for InMemoryInvitationRepository {
    async fn insert_invitation(&self, invitation: &InvitationToken) -> DomainResult<()> {
        self.tokens.lock().insert(invitation.token.clone(), invitation.clone());
        Ok(())
    }

    async fn find_invitation(&self, token: &str) -> DomainResult<Option<InvitationToken>> {
        Ok(self.tokens.lock().get(token).cloned())
    }

    async fn list_for_meeting(&self, meeting_id: &str) -> DomainResult<Vec<InvitationToken>> {
        let mut tokens: Vec<InvitationToken> = self
            .tokens
            .lock()
            .values()
            .filter(|t| t.meeting_id == meeting_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(tokens)
    }

    async fn redeem(
        &self,
        token: &str,
        wallet: &WalletAddress,
        from_stake: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<WalletEmailAssociation> {
        self.claim(token, wallet, from_stake, now, None)
    }

    async fn associations_for_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> DomainResult<Vec<WalletEmailAssociation>> {
        Ok(self
            .associations
            .lock()
            .iter()
            .filter(|a| &a.wallet_address == wallet)
            .cloned()
            .collect())
    }
}

/// In-memory `ContactRepository`.
#[derive(Default, Clone)]
pub struct InMemoryContactRepository {
    books: Arc<Mutex<HashMap<String, Vec<Contact>>>>,
}

impl InMemoryContactRepository {
    pub fn with_contacts(account_id: &str, contacts: &[(&str, &str)]) -> Self {
        let repo = Self::default();
        repo.books.lock().insert(
            account_id.to_string(),
            contacts
                .iter()
                .map(|(name, email)| Contact {
                    account_id: account_id.to_string(),
                    display_name: (*name).to_string(),
                    given_name: name.split(' ').next().map(str::to_string),
                    email: (*email).to_string(),
                })
                .collect(),
        );
        repo
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list_contacts(&self, account_id: &str) -> DomainResult<Vec<Contact>> {
        Ok(self.books.lock().get(account_id).cloned().unwrap_or_default())
    }

    async fn replace_contacts(
        &self,
        account_id: &str,
        contacts: &[Contact],
    ) -> DomainResult<usize> {
        self.books.lock().insert(account_id.to_string(), contacts.to_vec());
        Ok(contacts.len())
    }
}
