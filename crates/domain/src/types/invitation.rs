//! Invitation tokens and the wallet/e-mail links they create

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::WalletAddress;

/// Single-use credential binding an invited e-mail to a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationToken {
    pub token: String,
    pub meeting_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_by_wallet: Option<WalletAddress>,
    pub used_at: Option<DateTime<Utc>>,
}

impl InvitationToken {
    pub fn new(
        token: String,
        meeting_id: String,
        email: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            token,
            meeting_id,
            email,
            created_at: now,
            expires_at: now + ttl,
            used: false,
            used_by_wallet: None,
            used_at: None,
        }
    }

    /// Redemption requires `expires_at > now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

/// Wallet to e-mail link recorded when an invitation is redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEmailAssociation {
    pub wallet_address: WalletAddress,
    pub email: String,
    pub meeting_id: String,
    /// Redeemed as part of posting a stake.
    pub from_stake: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let token = InvitationToken::new(
            "abc".to_string(),
            "m-1".to_string(),
            "tom@example.com".to_string(),
            now,
            Duration::days(7),
        );

        assert!(token.is_redeemable(now + Duration::days(7) - Duration::seconds(1)));
        assert!(token.is_expired(now + Duration::days(7)));

        let used = InvitationToken { used: true, ..token };
        assert!(!used.is_redeemable(now));
    }
}
