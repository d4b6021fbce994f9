//! SQLite-backed implementation of the `InvitationRepository` port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use showup_core::InvitationRepository;
use showup_domain::{
    InvitationToken, Result as DomainResult, ShowupError, WalletAddress, WalletEmailAssociation,
};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use super::rows::{bool_to_int, from_opt_ts, from_ts, to_ts, wallet};
use crate::errors::conversions::{map_join_error, map_sql_error};

const TOKEN_COLUMNS: &str =
    "token, meeting_id, email, created_at, expires_at, used, used_by_wallet, used_at";

/// SQLite-backed invitation token repository.
pub struct SqliteInvitationRepository {
    db: Arc<DbManager>,
}

impl SqliteInvitationRepository {
    /// Create a new repository backed by the shared `DbManager`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationRepository for SqliteInvitationRepository {
    #[instrument(skip(self, invitation), fields(meeting_id = %invitation.meeting_id))]
    async fn insert_invitation(&self, invitation: &InvitationToken) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let invitation = invitation.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!(
                    "INSERT INTO invitation_tokens ({TOKEN_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    invitation.token,
                    invitation.meeting_id,
                    invitation.email,
                    to_ts(invitation.created_at),
                    to_ts(invitation.expires_at),
                    bool_to_int(invitation.used),
                    invitation.used_by_wallet.as_ref().map(WalletAddress::as_str),
                    invitation.used_at.map(to_ts),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_invitation(&self, token: &str) -> DomainResult<Option<InvitationToken>> {
        let db = Arc::clone(&self.db);
        let token = token.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<InvitationToken>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM invitation_tokens WHERE token = ?1"),
                params![token],
                map_token_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn list_for_meeting(&self, meeting_id: &str) -> DomainResult<Vec<InvitationToken>> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<InvitationToken>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {TOKEN_COLUMNS} FROM invitation_tokens
                     WHERE meeting_id = ?1 ORDER BY created_at, email"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt.query_map(params![meeting_id], map_token_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, token), fields(wallet = %wallet))]
    async fn redeem(
        &self,
        token: &str,
        wallet: &WalletAddress,
        from_stake: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<WalletEmailAssociation> {
        let db = Arc::clone(&self.db);
        let token = token.to_string();
        let wallet = wallet.clone();

        task::spawn_blocking(move || -> DomainResult<WalletEmailAssociation> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            let association = redeem_token(&tx, &token, &wallet, from_stake, now, None)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(association)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn associations_for_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> DomainResult<Vec<WalletEmailAssociation>> {
        let db = Arc::clone(&self.db);
        let wallet = wallet.clone();

        task::spawn_blocking(move || -> DomainResult<Vec<WalletEmailAssociation>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT wallet_address, email, meeting_id, from_stake, created_at
                     FROM wallet_email_associations WHERE wallet_address = ?1
                     ORDER BY created_at, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![wallet.as_str()], map_association_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Claim an unused, unexpired token and record the wallet association.
///
/// Runs on the caller's transaction; nothing is committed here. With
/// `meeting_id` set, a token issued for another meeting is refused.
pub(super) fn redeem_token(
    conn: &Connection,
    token: &str,
    wallet: &WalletAddress,
    from_stake: bool,
    now: DateTime<Utc>,
    meeting_id: Option<&str>,
) -> DomainResult<WalletEmailAssociation> {
    let claimed = conn
        .execute(
            "UPDATE invitation_tokens SET used = 1, used_by_wallet = ?2, used_at = ?3
             WHERE token = ?1 AND used = 0 AND expires_at > ?3
               AND (?4 IS NULL OR meeting_id = ?4)",
            params![token, wallet.as_str(), to_ts(now), meeting_id],
        )
        .map_err(map_sql_error)?;

    let current = conn
        .query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM invitation_tokens WHERE token = ?1"),
            params![token],
            map_token_row,
        )
        .optional()
        .map_err(map_sql_error)?
        .ok_or_else(|| ShowupError::NotFound("invitation token".to_string()))?;

    if claimed == 0 {
        debug!(meeting_id = %current.meeting_id, used = current.used, "redemption refused");
        return Err(match meeting_id {
            Some(expected) if expected != current.meeting_id => ShowupError::InvalidInput(
                "invitation token belongs to a different meeting".to_string(),
            ),
            _ if current.used => ShowupError::Conflict("invitation already used".to_string()),
            _ => ShowupError::Conflict("invitation expired".to_string()),
        });
    }

    let association = WalletEmailAssociation {
        wallet_address: wallet.clone(),
        email: current.email,
        meeting_id: current.meeting_id,
        from_stake,
        created_at: now,
    };
    conn.execute(
        "INSERT INTO wallet_email_associations
            (wallet_address, email, meeting_id, from_stake, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            association.wallet_address.as_str(),
            association.email,
            association.meeting_id,
            bool_to_int(association.from_stake),
            to_ts(association.created_at),
        ],
    )
    .map_err(map_sql_error)?;

    Ok(association)
}

fn map_token_row(row: &Row<'_>) -> rusqlite::Result<InvitationToken> {
    let used_by: Option<String> = row.get(6)?;
    Ok(InvitationToken {
        token: row.get(0)?,
        meeting_id: row.get(1)?,
        email: row.get(2)?,
        created_at: from_ts(3, row.get(3)?)?,
        expires_at: from_ts(4, row.get(4)?)?,
        used: row.get::<_, i64>(5)? != 0,
        used_by_wallet: used_by.map(|w| wallet(6, w)).transpose()?,
        used_at: from_opt_ts(7, row.get(7)?)?,
    })
}

fn map_association_row(row: &Row<'_>) -> rusqlite::Result<WalletEmailAssociation> {
    Ok(WalletEmailAssociation {
        wallet_address: wallet(0, row.get(0)?)?,
        email: row.get(1)?,
        meeting_id: row.get(2)?,
        from_stake: row.get::<_, i64>(3)? != 0,
        created_at: from_ts(4, row.get(4)?)?,
    })
}
