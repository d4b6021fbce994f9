//! Meeting scheduler - propose, schedule, cancel and inspect meetings

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showup_common::{Clock, EmailValidator, StringValidator, ValidationError};
use showup_domain::{
    validate_time_range, ContactResolution, MeetingLifecycle, MeetingStake, MeetingStatus,
    PendingMeeting, Result, ShowupError, StakeAmount, StakingConfig, WalletAddress,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::meeting_not_found;
use super::ports::MeetingRepository;
use crate::calendar_ports::{CalendarEventRequest, CalendarProvider};
use crate::contacts::ContactResolver;
use crate::invitations::InvitationService;

const MAX_TITLE_LENGTH: usize = 200;

/// Request to propose a meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeMeetingRequest {
    pub organizer: WalletAddress,
    pub organizer_email: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Free-text attendee tokens (names or e-mails)
    pub attendees: Vec<String>,
    pub required_stake: StakeAmount,
}

/// Outcome of a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProposalOutcome {
    Created { meeting: PendingMeeting },
    /// Some attendee tokens were ambiguous or unmatched; nothing was saved.
    NeedsDisambiguation { unresolved: Vec<ContactResolution> },
}

/// A meeting with its stake ledger (once initialized) and derived status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingOverview {
    pub meeting: PendingMeeting,
    pub stake: Option<MeetingStake>,
    pub status: MeetingStatus,
}

/// Meeting scheduler
pub struct MeetingScheduler {
    meetings: Arc<dyn MeetingRepository>,
    resolver: Arc<ContactResolver>,
    calendar: Arc<dyn CalendarProvider>,
    invitations: Arc<InvitationService>,
    clock: Arc<dyn Clock>,
    config: StakingConfig,
}

impl MeetingScheduler {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        resolver: Arc<ContactResolver>,
        calendar: Arc<dyn CalendarProvider>,
        invitations: Arc<InvitationService>,
        clock: Arc<dyn Clock>,
        config: StakingConfig,
    ) -> Self {
        Self { meetings, resolver, calendar, invitations, clock, config }
    }

    /// Validate, resolve attendees and persist a pending meeting.
    pub async fn propose(&self, request: ProposeMeetingRequest) -> Result<ProposalOutcome> {
        self.validate(&request)?;

        let tokens: Vec<String> = request
            .attendees
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        let resolutions = self.resolver.resolve(request.organizer_email.trim(), &tokens).await?;
        let mut attendees = Vec::with_capacity(resolutions.len());
        let mut unresolved = Vec::new();
        for resolution in resolutions {
            match resolution.resolved_email() {
                Some(email) => {
                    if !attendees.iter().any(|a: &String| a.eq_ignore_ascii_case(email)) {
                        attendees.push(email.to_string());
                    }
                }
                None => unresolved.push(resolution),
            }
        }
        if !unresolved.is_empty() {
            info!(unresolved = unresolved.len(), "meeting proposal needs disambiguation");
            return Ok(ProposalOutcome::NeedsDisambiguation { unresolved });
        }

        let meeting = PendingMeeting {
            meeting_id: Uuid::new_v4().to_string(),
            organizer: request.organizer,
            organizer_email: request.organizer_email.trim().to_string(),
            title: request.title.trim().to_string(),
            description: request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            required_stake: request.required_stake,
            attendees,
            lifecycle: MeetingLifecycle::Pending,
            created_at: self.clock.now(),
        };
        self.meetings.insert_pending(&meeting).await?;

        info!(
            meeting_id = %meeting.meeting_id,
            organizer = %meeting.organizer,
            attendees = meeting.attendees.len(),
            required_stake = %meeting.required_stake,
            "meeting_proposed"
        );
        Ok(ProposalOutcome::Created { meeting })
    }

    /// Create the calendar event and invite attendees. Organizer only.
    ///
    /// The calendar event must be created; invitations are best-effort.
    pub async fn schedule(
        &self,
        meeting_id: &str,
        requested_by: &WalletAddress,
    ) -> Result<MeetingStake> {
        let pending = self.load_pending(meeting_id).await?;
        ensure_organizer(&pending, requested_by, "schedule")?;
        let next = pending.lifecycle.transition(MeetingLifecycle::Scheduled)?;

        let event = CalendarEventRequest {
            summary: pending.title.clone(),
            description: pending.description.clone(),
            start_time: pending.start_time,
            end_time: pending.end_time,
            attendees: pending.attendees.clone(),
        };
        let event_id = self.calendar.create_event(&pending.organizer_email, &event).await?;
        self.meetings.set_event_id(meeting_id, &event_id).await?;

        if !self.meetings.transition_lifecycle(meeting_id, pending.lifecycle, next).await? {
            return Err(ShowupError::Conflict(format!(
                "meeting {meeting_id} changed state while scheduling"
            )));
        }
        info!(meeting_id, event_id, "meeting_scheduled");

        for email in &pending.attendees {
            if let Err(err) = self.invitations.issue(meeting_id, email).await {
                warn!(meeting_id, email, error = %err, "failed to issue invitation");
            }
        }

        self.meetings
            .find_meeting(meeting_id)
            .await?
            .ok_or_else(|| meeting_not_found(meeting_id))
    }

    /// Cancel a meeting. Organizer only.
    pub async fn cancel(
        &self,
        meeting_id: &str,
        requested_by: &WalletAddress,
    ) -> Result<PendingMeeting> {
        let pending = self.load_pending(meeting_id).await?;
        ensure_organizer(&pending, requested_by, "cancel")?;
        if let Some(meeting) = self.meetings.find_meeting(meeting_id).await? {
            if meeting.is_frozen() {
                return Err(ShowupError::Conflict(format!(
                    "meeting {meeting_id} is settled or cancelled"
                )));
            }
        }
        let next = pending.lifecycle.transition(MeetingLifecycle::Cancelled)?;

        if !self.meetings.transition_lifecycle(meeting_id, pending.lifecycle, next).await? {
            return Err(ShowupError::Conflict(format!(
                "meeting {meeting_id} changed state while cancelling"
            )));
        }
        info!(meeting_id, from = %pending.lifecycle, "meeting_cancelled");

        Ok(PendingMeeting { lifecycle: next, ..pending })
    }

    /// Meeting plus derived status at the current clock.
    pub async fn get(&self, meeting_id: &str) -> Result<MeetingOverview> {
        let meeting = self.load_pending(meeting_id).await?;
        let stake = self.meetings.find_meeting(meeting_id).await?;
        let is_settled = stake.as_ref().is_some_and(|s| s.is_settled);
        let status = self.config.windows().derive_status(
            meeting.start_time,
            meeting.end_time,
            is_settled,
            self.clock.now(),
        );
        Ok(MeetingOverview { meeting, stake, status })
    }

    async fn load_pending(&self, meeting_id: &str) -> Result<PendingMeeting> {
        self.meetings.find_pending(meeting_id).await?.ok_or_else(|| meeting_not_found(meeting_id))
    }

    fn validate(&self, request: &ProposeMeetingRequest) -> Result<()> {
        let mut errors = ValidationError::new();
        errors.check(
            "title",
            request.title.as_str(),
            &StringValidator::new().not_empty().max_length(MAX_TITLE_LENGTH).trim(true),
        );
        errors.check("organizer_email", request.organizer_email.as_str(), &EmailValidator::new());
        if request.attendees.iter().all(|a| a.trim().is_empty()) {
            errors.add_field_error("attendees", "At least one attendee is required");
        }
        if let Err(err) = validate_time_range(request.start_time, request.end_time) {
            errors.add_field_error("end_time", err.to_string());
        }
        if request.start_time <= self.clock.now() {
            errors.add_field_error("start_time", "Meeting must start in the future");
        }

        errors.into_result().map_err(|e| ShowupError::InvalidInput(e.to_string()))
    }
}

fn ensure_organizer(
    meeting: &PendingMeeting,
    requested_by: &WalletAddress,
    action: &str,
) -> Result<()> {
    if &meeting.organizer == requested_by {
        Ok(())
    } else {
        Err(ShowupError::Auth(format!("only the organizer can {action} this meeting")))
    }
}
