//! SQLite-backed implementation of the `MeetingRepository` port.
//!
//! A meeting lives in one row from proposal to settlement. The stake-ledger
//! columns become meaningful once `initialized = 1`; every guarded write is
//! a single conditional statement so concurrent callers cannot both win.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use showup_core::MeetingRepository;
use showup_domain::{
    AttendanceCode, MeetingLifecycle, MeetingStake, PendingMeeting, Result as DomainResult,
    ShowupError, StakeRecord, WalletAddress,
};
use tokio::task;
use tracing::{debug, instrument};

use super::invitation_repository::redeem_token;
use super::manager::DbManager;
use super::rows::{amount, bool_to_int, from_opt_ts, from_ts, lifecycle, to_ts, wallet};
use crate::errors::conversions::{map_join_error, map_sql_error};

const PENDING_COLUMNS: &str = "meeting_id, organizer, organizer_email, title, description,
    start_time, end_time, required_stake_wei, attendees_json, lifecycle, created_at";

const MEETING_COLUMNS: &str = "meeting_id, event_id, organizer, title, required_stake_wei,
    start_time, end_time, attendance_code, code_generated_at, is_settled, lifecycle";

/// Stakes and check-ins are only written while this holds for `?1`.
const OPEN_MEETING: &str = "EXISTS (SELECT 1 FROM meetings WHERE meeting_id = ?1
    AND initialized = 1 AND is_settled = 0 AND lifecycle <> 'cancelled')";

const STAKE_COLUMNS: &str = "wallet_address, email, amount_wei, staked_at, has_checked_in,
    check_in_time, is_refunded";

/// SQLite-backed meeting and stake repository.
pub struct SqliteMeetingRepository {
    db: Arc<DbManager>,
}

impl SqliteMeetingRepository {
    /// Create a new repository backed by the shared `DbManager`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MeetingRepository for SqliteMeetingRepository {
    #[instrument(skip(self, meeting), fields(meeting_id = %meeting.meeting_id))]
    async fn insert_pending(&self, meeting: &PendingMeeting) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let meeting = meeting.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let attendees = serde_json::to_string(&meeting.attendees).map_err(|err| {
                ShowupError::Internal(format!("failed to encode attendees: {err}"))
            })?;

            conn.execute(
                "INSERT INTO meetings (meeting_id, organizer, organizer_email, title, description,
                    start_time, end_time, required_stake_wei, attendees_json, lifecycle,
                    initialized, is_settled, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, 0, ?11)",
                params![
                    meeting.meeting_id,
                    meeting.organizer.as_str(),
                    meeting.organizer_email,
                    meeting.title,
                    meeting.description,
                    to_ts(meeting.start_time),
                    to_ts(meeting.end_time),
                    meeting.required_stake.wei().to_string(),
                    attendees,
                    meeting.lifecycle.to_string(),
                    to_ts(meeting.created_at),
                ],
            )
            .map_err(|err| match map_sql_error(err) {
                ShowupError::Conflict(_) => {
                    ShowupError::Conflict(format!("meeting {} already exists", meeting.meeting_id))
                }
                other => other,
            })?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn find_pending(&self, meeting_id: &str) -> DomainResult<Option<PendingMeeting>> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<PendingMeeting>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {PENDING_COLUMNS} FROM meetings WHERE meeting_id = ?1"),
                params![meeting_id],
                map_pending_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn find_meeting(&self, meeting_id: &str) -> DomainResult<Option<MeetingStake>> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<MeetingStake>> {
            let conn = db.get_connection()?;
            let meeting = conn
                .query_row(
                    &format!(
                        "SELECT {MEETING_COLUMNS} FROM meetings
                         WHERE meeting_id = ?1 AND initialized = 1"
                    ),
                    params![meeting_id],
                    map_meeting_row,
                )
                .optional()
                .map_err(map_sql_error)?;

            match meeting {
                Some(mut meeting) => {
                    meeting.stakes = load_stakes(&conn, &meeting.meeting_id)?;
                    Ok(Some(meeting))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, meeting), fields(meeting_id = %meeting.meeting_id))]
    async fn initialize(&self, meeting: &MeetingStake) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting.meeting_id.clone();
        let lifecycle = meeting.lifecycle;

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE meetings SET initialized = 1, is_settled = 0, lifecycle = ?2
                     WHERE meeting_id = ?1 AND initialized = 0 AND lifecycle = 'pending'",
                    params![meeting_id, lifecycle.to_string()],
                )
                .map_err(map_sql_error)?;

            if updated == 0 {
                ensure_exists(&conn, &meeting_id)?;
                debug!(meeting_id = %meeting_id, "meeting already initialized");
                return Ok(false);
            }
            Ok(true)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn transition_lifecycle(
        &self,
        meeting_id: &str,
        from: MeetingLifecycle,
        to: MeetingLifecycle,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE meetings SET lifecycle = ?3
                     WHERE meeting_id = ?1 AND lifecycle = ?2 AND is_settled = 0",
                    params![meeting_id, from.to_string(), to.to_string()],
                )
                .map_err(map_sql_error)?;

            if updated == 0 {
                ensure_exists(&conn, &meeting_id)?;
                return Ok(false);
            }
            Ok(true)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn set_event_id(&self, meeting_id: &str, event_id: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let event_id = event_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE meetings SET event_id = ?2 WHERE meeting_id = ?1 AND initialized = 1",
                    params![meeting_id, event_id],
                )
                .map_err(map_sql_error)?;
            require_updated(updated, &meeting_id)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, stake), fields(wallet = %stake.wallet_address))]
    async fn insert_stake(&self, meeting_id: &str, stake: &StakeRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let stake = stake.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_stake_row(&conn, &meeting_id, &stake)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, stake, token), fields(wallet = %stake.wallet_address))]
    async fn insert_invited_stake(
        &self,
        meeting_id: &str,
        stake: &StakeRecord,
        token: &str,
    ) -> DomainResult<StakeRecord> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let token = token.to_string();
        let stake = stake.clone();

        task::spawn_blocking(move || -> DomainResult<StakeRecord> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let association = redeem_token(
                &tx,
                &token,
                &stake.wallet_address,
                true,
                stake.staked_at,
                Some(&meeting_id),
            )?;
            let stake = StakeRecord { email: Some(association.email), ..stake };
            insert_stake_row(&tx, &meeting_id, &stake)?;

            tx.commit().map_err(map_sql_error)?;
            Ok(stake)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, code))]
    async fn set_attendance_code(
        &self,
        meeting_id: &str,
        code: &AttendanceCode,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let code = code.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE meetings SET attendance_code = ?2, code_generated_at = ?3
                     WHERE meeting_id = ?1 AND initialized = 1",
                    params![meeting_id, code.code, to_ts(code.generated_at)],
                )
                .map_err(map_sql_error)?;
            require_updated(updated, &meeting_id)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn mark_checked_in(
        &self,
        meeting_id: &str,
        wallet: &WalletAddress,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let wallet = wallet.clone();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    &format!(
                        "UPDATE stakes SET has_checked_in = 1, check_in_time = ?3
                         WHERE meeting_id = ?1 AND wallet_address = ?2 AND {OPEN_MEETING}"
                    ),
                    params![meeting_id, wallet.as_str(), to_ts(at)],
                )
                .map_err(map_sql_error)?;

            if updated == 0 {
                ensure_open(&conn, &meeting_id)?;
                return Ok(false);
            }
            Ok(true)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, refunded), fields(refunded = refunded.len()))]
    async fn mark_settled(
        &self,
        meeting_id: &str,
        refunded: &[WalletAddress],
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let meeting_id = meeting_id.to_string();
        let refunded = refunded.to_vec();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let flipped = tx
                .execute(
                    "UPDATE meetings SET is_settled = 1
                     WHERE meeting_id = ?1 AND initialized = 1 AND is_settled = 0",
                    params![meeting_id],
                )
                .map_err(map_sql_error)?;

            if flipped == 0 {
                ensure_initialized(&tx, &meeting_id)?;
                return Ok(false);
            }

            {
                let mut stmt = tx
                    .prepare(
                        "UPDATE stakes SET is_refunded = 1
                         WHERE meeting_id = ?1 AND wallet_address = ?2",
                    )
                    .map_err(map_sql_error)?;
                for wallet in &refunded {
                    stmt.execute(params![meeting_id, wallet.as_str()]).map_err(map_sql_error)?;
                }
            }

            tx.commit().map_err(map_sql_error)?;
            Ok(true)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn map_pending_row(row: &Row<'_>) -> rusqlite::Result<PendingMeeting> {
    let attendees_json: String = row.get(8)?;
    let attendees: Vec<String> = serde_json::from_str(&attendees_json).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(PendingMeeting {
        meeting_id: row.get(0)?,
        organizer: wallet(1, row.get(1)?)?,
        organizer_email: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        start_time: from_ts(5, row.get(5)?)?,
        end_time: from_ts(6, row.get(6)?)?,
        required_stake: amount(7, row.get(7)?)?,
        attendees,
        lifecycle: lifecycle(9, row.get(9)?)?,
        created_at: from_ts(10, row.get(10)?)?,
    })
}

fn map_meeting_row(row: &Row<'_>) -> rusqlite::Result<MeetingStake> {
    let code: Option<String> = row.get(7)?;
    let generated_at = from_opt_ts(8, row.get(8)?)?;
    let attendance_code = match (code, generated_at) {
        (Some(code), Some(generated_at)) => Some(AttendanceCode { code, generated_at }),
        _ => None,
    };

    Ok(MeetingStake {
        meeting_id: row.get(0)?,
        event_id: row.get(1)?,
        organizer: wallet(2, row.get(2)?)?,
        title: row.get(3)?,
        required_stake: amount(4, row.get(4)?)?,
        start_time: from_ts(5, row.get(5)?)?,
        end_time: from_ts(6, row.get(6)?)?,
        attendance_code,
        is_settled: row.get::<_, i64>(9)? != 0,
        lifecycle: lifecycle(10, row.get(10)?)?,
        stakes: Vec::new(),
    })
}

fn map_stake_row(row: &Row<'_>) -> rusqlite::Result<StakeRecord> {
    Ok(StakeRecord {
        wallet_address: wallet(0, row.get(0)?)?,
        email: row.get(1)?,
        amount: amount(2, row.get(2)?)?,
        staked_at: from_ts(3, row.get(3)?)?,
        has_checked_in: row.get::<_, i64>(4)? != 0,
        check_in_time: from_opt_ts(5, row.get(5)?)?,
        is_refunded: row.get::<_, i64>(6)? != 0,
    })
}

fn load_stakes(conn: &Connection, meeting_id: &str) -> DomainResult<Vec<StakeRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {STAKE_COLUMNS} FROM stakes WHERE meeting_id = ?1 ORDER BY staked_at, id"
        ))
        .map_err(map_sql_error)?;
    let rows = stmt.query_map(params![meeting_id], map_stake_row).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

fn insert_stake_row(conn: &Connection, meeting_id: &str, stake: &StakeRecord) -> DomainResult<()> {
    // The unique (meeting_id, wallet_address) index is the duplicate guard.
    let inserted = conn
        .execute(
            &format!(
                "INSERT INTO stakes (meeting_id, wallet_address, email, amount_wei, staked_at,
                    has_checked_in, check_in_time, is_refunded)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8 WHERE {OPEN_MEETING}"
            ),
            params![
                meeting_id,
                stake.wallet_address.as_str(),
                stake.email,
                stake.amount.wei().to_string(),
                to_ts(stake.staked_at),
                bool_to_int(stake.has_checked_in),
                stake.check_in_time.map(to_ts),
                bool_to_int(stake.is_refunded),
            ],
        )
        .map_err(|err| match map_sql_error(err) {
            ShowupError::Conflict(_) => {
                ShowupError::Conflict(format!("wallet {} has already staked", stake.wallet_address))
            }
            other => other,
        })?;

    if inserted == 0 {
        ensure_open(conn, meeting_id)?;
        return Err(ShowupError::Conflict(format!("meeting {meeting_id} is not accepting stakes")));
    }
    Ok(())
}

/// `NotFound` for unknown or uninitialized meetings, `Conflict` once settled or cancelled.
fn ensure_open(conn: &Connection, meeting_id: &str) -> DomainResult<()> {
    let state: Option<(i64, String)> = conn
        .query_row(
            "SELECT is_settled, lifecycle FROM meetings WHERE meeting_id = ?1 AND initialized = 1",
            params![meeting_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(map_sql_error)?;

    match state {
        None => Err(not_found(meeting_id)),
        Some((settled, _)) if settled != 0 => {
            Err(ShowupError::Conflict(format!("meeting {meeting_id} is already settled")))
        }
        Some((_, lifecycle)) if lifecycle == "cancelled" => {
            Err(ShowupError::Conflict(format!("meeting {meeting_id} was cancelled")))
        }
        Some(_) => Ok(()),
    }
}

fn ensure_exists(conn: &Connection, meeting_id: &str) -> DomainResult<()> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM meetings WHERE meeting_id = ?1", params![meeting_id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(map_sql_error)?;
    found.map(|_| ()).ok_or_else(|| not_found(meeting_id))
}

fn ensure_initialized(conn: &Connection, meeting_id: &str) -> DomainResult<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM meetings WHERE meeting_id = ?1 AND initialized = 1",
            params![meeting_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_sql_error)?;
    found.map(|_| ()).ok_or_else(|| not_found(meeting_id))
}

fn require_updated(rows: usize, meeting_id: &str) -> DomainResult<()> {
    if rows == 0 {
        Err(not_found(meeting_id))
    } else {
        Ok(())
    }
}

fn not_found(meeting_id: &str) -> ShowupError {
    ShowupError::NotFound(format!("meeting {meeting_id}"))
}
