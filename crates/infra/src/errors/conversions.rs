//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use showup_domain::ShowupError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ShowupError);

impl From<InfraError> for ShowupError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ShowupError> for InfraError {
    fn from(value: ShowupError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoShowupError {
    fn into_showup(self) -> ShowupError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ShowupError */
/* -------------------------------------------------------------------------- */

/// SQLITE_CONSTRAINT_UNIQUE
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLITE_CONSTRAINT_PRIMARYKEY
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
/// SQLITE_CONSTRAINT_CHECK
const SQLITE_CONSTRAINT_CHECK: i32 = 275;
/// SQLITE_CONSTRAINT_FOREIGNKEY
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

impl IntoShowupError for SqlError {
    fn into_showup(self) -> ShowupError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ShowupError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ShowupError::Database("database is locked".into())
                    }
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => ShowupError::Conflict(format!("unique constraint violation: {message}")),
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_CHECK) => {
                        ShowupError::InvalidInput(format!("check constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        ShowupError::Database("foreign key constraint violation".into())
                    }
                    _ => ShowupError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ShowupError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ShowupError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ShowupError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => ShowupError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                ShowupError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => ShowupError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => ShowupError::Database("invalid SQL query".into()),
            other => ShowupError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_showup())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ShowupError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(ShowupError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ShowupError */
/* -------------------------------------------------------------------------- */

impl IntoShowupError for HttpError {
    fn into_showup(self) -> ShowupError {
        if self.is_timeout() {
            return ShowupError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ShowupError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ShowupError::Auth(message),
                404 => ShowupError::NotFound(message),
                429 => ShowupError::Network(message),
                400..=499 => ShowupError::InvalidInput(message),
                _ => ShowupError::Network(message),
            };
        }

        ShowupError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_showup())
    }
}

/// Map a join failure from `spawn_blocking` into the domain error.
pub fn map_join_error(err: tokio::task::JoinError) -> ShowupError {
    ShowupError::Internal(format!("Task join error: {err}"))
}

/// Map a rusqlite failure straight into the domain error.
pub fn map_sql_error(err: SqlError) -> ShowupError {
    ShowupError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
