//! SQLite-backed address books and calendar credentials.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use showup_core::{CalendarCredential, CalendarCredentialRepository, ContactRepository};
use showup_domain::{Contact, Result as DomainResult};
use tokio::task;
use tracing::{info, instrument};

use super::manager::DbManager;
use super::rows::{from_opt_ts, to_ts};
use crate::errors::conversions::{map_join_error, map_sql_error};

/// SQLite-backed address-book repository.
pub struct SqliteContactRepository {
    db: Arc<DbManager>,
}

impl SqliteContactRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    #[instrument(skip(self))]
    async fn list_contacts(&self, account_id: &str) -> DomainResult<Vec<Contact>> {
        let db = Arc::clone(&self.db);
        let account_id = account_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<Contact>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT account_id, display_name, given_name, email FROM contacts
                     WHERE account_id = ?1 ORDER BY id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![account_id], |row| {
                    Ok(Contact {
                        account_id: row.get(0)?,
                        display_name: row.get(1)?,
                        given_name: row.get(2)?,
                        email: row.get(3)?,
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, contacts), fields(count = contacts.len()))]
    async fn replace_contacts(
        &self,
        account_id: &str,
        contacts: &[Contact],
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let account_id = account_id.to_string();
        let contacts = contacts.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            tx.execute("DELETE FROM contacts WHERE account_id = ?1", params![account_id])
                .map_err(map_sql_error)?;

            let mut stored = 0;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO contacts (account_id, email, display_name, given_name)
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .map_err(map_sql_error)?;
                for contact in &contacts {
                    stored += stmt
                        .execute(params![
                            account_id,
                            contact.email.trim(),
                            contact.display_name.trim(),
                            contact.given_name.as_deref().map(str::trim),
                        ])
                        .map_err(map_sql_error)?;
                }
            }

            tx.commit().map_err(map_sql_error)?;
            info!(account_id = %account_id, stored, "address book replaced");
            Ok(stored)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// SQLite-backed store of organizer calendar credentials.
pub struct SqliteCalendarCredentialRepository {
    db: Arc<DbManager>,
}

impl SqliteCalendarCredentialRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CalendarCredentialRepository for SqliteCalendarCredentialRepository {
    async fn get_credential(&self, account_id: &str) -> DomainResult<Option<CalendarCredential>> {
        let db = Arc::clone(&self.db);
        let account_id = account_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<CalendarCredential>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT account_id, access_token, expires_at FROM calendar_credentials
                 WHERE account_id = ?1",
                params![account_id],
                |row| {
                    Ok(CalendarCredential {
                        account_id: row.get(0)?,
                        access_token: row.get(1)?,
                        expires_at: from_opt_ts(2, row.get(2)?)?,
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, credential), fields(account_id = %credential.account_id))]
    async fn save_credential(&self, credential: &CalendarCredential) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let credential = credential.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO calendar_credentials (account_id, access_token, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, CAST(strftime('%s','now') AS INTEGER))
                 ON CONFLICT(account_id) DO UPDATE SET
                    access_token = excluded.access_token,
                    expires_at = excluded.expires_at,
                    updated_at = excluded.updated_at",
                params![
                    credential.account_id,
                    credential.access_token,
                    credential.expires_at.map(to_ts)
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
