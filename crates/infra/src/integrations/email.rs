//! Transactional e-mail notifier
//!
//! Sends invitation and stake-confirmation messages through a JSON e-mail
//! API (`POST {base_url}/emails`). When e-mail is disabled the
//! [`LoggingNotifier`] records what would have been sent instead.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use showup_core::{InvitationNotice, Notifier, StakeConfirmationNotice};
use showup_domain::{EmailConfig, Result, ShowupError};
use tracing::info;

use crate::http::HttpClient;

/// Rendered message ready for the e-mail API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// Notifier backed by the e-mail HTTP API.
pub struct EmailNotifier {
    http: HttpClient,
    base_url: String,
    api_key: String,
    from_address: String,
    app_url: String,
}

impl EmailNotifier {
    /// Build from configuration; the API key is mandatory.
    pub fn from_config(http: HttpClient, config: &EmailConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ShowupError::Config("email.api_key is not set".to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address: config.from_address.clone(),
            app_url: config.app_url.clone(),
        })
    }

    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(email);
        self.http.expect_success(request, "send email").await?;

        info!(recipient = ?email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_invitation(&self, notice: &InvitationNotice) -> Result<()> {
        let email = render_invitation(&self.from_address, &self.app_url, notice);
        self.deliver(&email).await
    }

    async fn send_stake_confirmation(&self, notice: &StakeConfirmationNotice) -> Result<()> {
        let email = render_confirmation(&self.from_address, &self.app_url, notice);
        self.deliver(&email).await
    }
}

/// Notifier used when e-mail delivery is disabled.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_invitation(&self, notice: &InvitationNotice) -> Result<()> {
        info!(
            meeting_id = %notice.meeting_id,
            recipient = %notice.recipient,
            "email disabled; invitation not sent"
        );
        Ok(())
    }

    async fn send_stake_confirmation(&self, notice: &StakeConfirmationNotice) -> Result<()> {
        info!(
            meeting_id = %notice.meeting_id,
            recipient = %notice.recipient,
            "email disabled; stake confirmation not sent"
        );
        Ok(())
    }
}

pub fn render_invitation(from: &str, app_url: &str, notice: &InvitationNotice) -> OutgoingEmail {
    let link = format!("{}/invite/{}", app_url.trim_end_matches('/'), notice.token);
    let text = format!(
        "You have been invited to \"{title}\" on {start}.\n\n\
         Joining requires a stake of {stake} ETH, refunded when you check in.\n\n\
         Accept the invitation: {link}\n",
        title = notice.meeting_title,
        start = notice.start_time.format("%Y-%m-%d %H:%M UTC"),
        stake = notice.required_stake,
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![notice.recipient.clone()],
        subject: format!("Invitation: {}", notice.meeting_title),
        text,
    }
}

pub fn render_confirmation(
    from: &str,
    app_url: &str,
    notice: &StakeConfirmationNotice,
) -> OutgoingEmail {
    let link = format!("{}/meetings/{}", app_url.trim_end_matches('/'), notice.meeting_id);
    let text = format!(
        "Your stake of {amount} ETH from {wallet} for \"{title}\" on {start} is confirmed.\n\n\
         Check in with the attendance code during the meeting to get it back.\n\n\
         Meeting details: {link}\n",
        amount = notice.amount,
        wallet = notice.wallet_address,
        title = notice.meeting_title,
        start = notice.start_time.format("%Y-%m-%d %H:%M UTC"),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![notice.recipient.clone()],
        subject: format!("Stake confirmed: {}", notice.meeting_title),
        text,
    }
}
