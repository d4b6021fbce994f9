//! Invitation service - issuing and redeeming invitation tokens

use std::sync::Arc;

use showup_common::{generate_secure_token, Clock, EmailValidator, FieldValidator};
use showup_domain::constants::INVITATION_TOKEN_BYTES;
use showup_domain::{
    InvitationToken, PendingMeeting, Result, ShowupError, StakingConfig, WalletAddress,
    WalletEmailAssociation,
};
use tracing::{info, warn};

use super::ports::InvitationRepository;
use crate::meetings::meeting_not_found;
use crate::meetings::ports::MeetingRepository;
use crate::notification_ports::{InvitationNotice, Notifier};

/// Invitation service
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    meetings: Arc<dyn MeetingRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: StakingConfig,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        meetings: Arc<dyn MeetingRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: StakingConfig,
    ) -> Self {
        Self { invitations, meetings, notifier, clock, config }
    }

    /// Issue a token for `email` and e-mail it. A failed e-mail is logged only.
    pub async fn issue(&self, meeting_id: &str, email: &str) -> Result<InvitationToken> {
        let email = email.trim();
        EmailValidator::new().validate(email).map_err(ShowupError::InvalidInput)?;

        let meeting = self
            .meetings
            .find_pending(meeting_id)
            .await?
            .ok_or_else(|| meeting_not_found(meeting_id))?;
        if meeting.lifecycle.is_cancelled() {
            return Err(ShowupError::Conflict(format!("meeting {meeting_id} was cancelled")));
        }

        let invitation = InvitationToken::new(
            generate_secure_token(INVITATION_TOKEN_BYTES),
            meeting_id.to_string(),
            email.to_string(),
            self.clock.now(),
            self.config.invitation_ttl(),
        );
        self.invitations.insert_invitation(&invitation).await?;
        info!(meeting_id, email, expires_at = %invitation.expires_at, "invitation_issued");

        self.notify(&meeting, &invitation).await;
        Ok(invitation)
    }

    /// Redeem a token outside of staking.
    pub async fn redeem(
        &self,
        token: &str,
        wallet: &WalletAddress,
    ) -> Result<WalletEmailAssociation> {
        let association = self.invitations.redeem(token, wallet, false, self.clock.now()).await?;
        info!(
            meeting_id = %association.meeting_id,
            wallet = %wallet,
            email = %association.email,
            "invitation_redeemed"
        );
        Ok(association)
    }

    /// Look up a token, e.g. to show the invitee what they are joining.
    pub async fn get(&self, token: &str) -> Result<InvitationToken> {
        self.invitations
            .find_invitation(token)
            .await?
            .ok_or_else(|| ShowupError::NotFound("invitation token".to_string()))
    }

    pub async fn list_for_meeting(&self, meeting_id: &str) -> Result<Vec<InvitationToken>> {
        self.invitations.list_for_meeting(meeting_id).await
    }

    pub async fn associations_for_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<WalletEmailAssociation>> {
        self.invitations.associations_for_wallet(wallet).await
    }

    async fn notify(&self, meeting: &PendingMeeting, invitation: &InvitationToken) {
        let notice = InvitationNotice {
            recipient: invitation.email.clone(),
            meeting_id: meeting.meeting_id.clone(),
            meeting_title: meeting.title.clone(),
            start_time: meeting.start_time,
            required_stake: meeting.required_stake,
            token: invitation.token.clone(),
        };
        if let Err(err) = self.notifier.send_invitation(&notice).await {
            warn!(
                meeting_id = %meeting.meeting_id,
                recipient = %notice.recipient,
                error = %err,
                "failed to send invitation"
            );
        }
    }
}
