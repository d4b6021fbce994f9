//! Stake ledger service - posting stakes against a meeting

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use showup_common::{Clock, EmailValidator};
use showup_domain::{
    MeetingStatus, PendingMeeting, Result, ShowupError, StakeAmount, StakeRecord, StakingConfig,
    WalletAddress,
};
use tracing::{info, warn};

use super::meeting_not_found;
use super::ports::MeetingRepository;
use crate::calendar_ports::CalendarProvider;
use crate::invitations::ports::InvitationRepository;
use crate::notification_ports::{Notifier, StakeConfirmationNotice};

/// Request to post a stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStakeRequest {
    pub meeting_id: String,
    pub wallet_address: WalletAddress,
    pub amount: StakeAmount,
    #[serde(default)]
    pub email: Option<String>,
    /// Invitation token that brought this staker in, if any
    #[serde(default)]
    pub invitation_token: Option<String>,
}

/// Result of a successful stake posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeReceipt {
    pub meeting_id: String,
    pub stake: StakeRecord,
    pub status: MeetingStatus,
    /// This stake initialized the meeting's ledger
    pub initialized: bool,
}

/// Stake ledger service
pub struct StakeLedger {
    meetings: Arc<dyn MeetingRepository>,
    invitations: Arc<dyn InvitationRepository>,
    calendar: Arc<dyn CalendarProvider>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: StakingConfig,
}

impl StakeLedger {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        invitations: Arc<dyn InvitationRepository>,
        calendar: Arc<dyn CalendarProvider>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: StakingConfig,
    ) -> Self {
        Self { meetings, invitations, calendar, notifier, clock, config }
    }

    /// Post a stake.
    ///
    /// Preconditions are checked before any write. With an invitation token
    /// the redemption and the stake insert are a single store write, and
    /// the invitation's e-mail is attached to the stake. The insert relies
    /// on the store's uniqueness and open-meeting guards, so two racing
    /// posts from one wallet cannot both succeed.
    pub async fn post_stake(&self, request: PostStakeRequest) -> Result<StakeReceipt> {
        let now = self.clock.now();
        let meeting_id = request.meeting_id.as_str();
        let windows = self.config.windows();

        let pending = self
            .meetings
            .find_pending(meeting_id)
            .await?
            .ok_or_else(|| meeting_not_found(meeting_id))?;
        if pending.lifecycle.is_cancelled() {
            return Err(ShowupError::Conflict(format!("meeting {meeting_id} was cancelled")));
        }

        let existing = self.meetings.find_meeting(meeting_id).await?;
        if let Some(meeting) = &existing {
            if meeting.is_settled {
                return Err(ShowupError::Conflict(format!(
                    "meeting {meeting_id} is already settled"
                )));
            }
            if meeting.stake_for(&request.wallet_address).is_some() {
                return Err(duplicate_stake(&request.wallet_address));
            }
        }

        if request.amount != pending.required_stake {
            return Err(ShowupError::InvalidInput(format!(
                "stake must equal the required {} (got {})",
                pending.required_stake, request.amount
            )));
        }

        let staking_deadline = windows.staking_deadline(pending.start_time);
        if self.config.enforce_staking_deadline && staking_deadline <= now {
            return Err(ShowupError::Conflict(format!(
                "staking for meeting {meeting_id} closed at {staking_deadline}"
            )));
        }

        let email = match &request.invitation_token {
            Some(token) => {
                self.check_invitation(meeting_id, token).await?;
                None
            }
            None => normalize_email(request.email.as_deref())?,
        };

        let initialized = match &existing {
            Some(_) => false,
            None => self.initialize(&pending).await?,
        };

        let stake = StakeRecord::new(request.wallet_address.clone(), request.amount, email, now);
        let stake = match &request.invitation_token {
            Some(token) => self.meetings.insert_invited_stake(meeting_id, &stake, token).await?,
            None => {
                self.meetings.insert_stake(meeting_id, &stake).await?;
                stake
            }
        };

        info!(
            meeting_id,
            wallet = %stake.wallet_address,
            amount = %stake.amount,
            initialized,
            "stake_posted"
        );

        if request.invitation_token.is_some() {
            self.add_staker_to_event(meeting_id, &pending, &stake).await;
        }
        self.send_confirmation(&pending, &stake).await;

        let status = windows.derive_status(pending.start_time, pending.end_time, false, now);
        Ok(StakeReceipt { meeting_id: meeting_id.to_string(), stake, status, initialized })
    }

    /// Refuse unusable tokens before the meeting is initialized.
    async fn check_invitation(&self, meeting_id: &str, token: &str) -> Result<()> {
        let invitation = self
            .invitations
            .find_invitation(token)
            .await?
            .ok_or_else(|| ShowupError::NotFound("invitation token".to_string()))?;
        if invitation.meeting_id != meeting_id {
            return Err(ShowupError::InvalidInput(
                "invitation token belongs to a different meeting".to_string(),
            ));
        }
        if invitation.used {
            return Err(ShowupError::Conflict("invitation already used".to_string()));
        }
        if invitation.is_expired(self.clock.now()) {
            return Err(ShowupError::Conflict("invitation expired".to_string()));
        }
        Ok(())
    }

    async fn initialize(&self, pending: &PendingMeeting) -> Result<bool> {
        let meeting = pending.initialize()?;
        let created = self.meetings.initialize(&meeting).await?;
        if created {
            info!(meeting_id = %meeting.meeting_id, "meeting_stake_initialized");
        }
        Ok(created)
    }

    async fn add_staker_to_event(
        &self,
        meeting_id: &str,
        pending: &PendingMeeting,
        stake: &StakeRecord,
    ) {
        let Some(email) = stake.email.as_deref() else {
            return;
        };
        let event_id = match self.meetings.find_meeting(meeting_id).await {
            Ok(Some(meeting)) => meeting.event_id,
            Ok(None) => None,
            Err(err) => {
                warn!(meeting_id, error = %err, "could not load meeting to add attendee");
                return;
            }
        };
        let Some(event_id) = event_id else {
            return;
        };

        if let Err(err) =
            self.calendar.add_attendee(&pending.organizer_email, &event_id, email).await
        {
            warn!(
                meeting_id,
                event_id,
                email,
                error = %err,
                "failed to add staker to calendar event"
            );
        }
    }

    async fn send_confirmation(&self, pending: &PendingMeeting, stake: &StakeRecord) {
        let Some(recipient) = stake.email.clone() else {
            return;
        };
        let notice = StakeConfirmationNotice {
            recipient,
            meeting_id: pending.meeting_id.clone(),
            meeting_title: pending.title.clone(),
            start_time: pending.start_time,
            amount: stake.amount,
            wallet_address: stake.wallet_address.clone(),
        };
        if let Err(err) = self.notifier.send_stake_confirmation(&notice).await {
            warn!(
                meeting_id = %pending.meeting_id,
                recipient = %notice.recipient,
                error = %err,
                "failed to send stake confirmation"
            );
        }
    }
}

fn normalize_email(email: Option<&str>) -> Result<Option<String>> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) if EmailValidator::is_email(email) => Ok(Some(email.to_string())),
        Some(email) => Err(ShowupError::InvalidInput(format!("invalid email: {email}"))),
        None => Ok(None),
    }
}

fn duplicate_stake(wallet: &WalletAddress) -> ShowupError {
    ShowupError::Conflict(format!("wallet {wallet} has already staked for this meeting"))
}
