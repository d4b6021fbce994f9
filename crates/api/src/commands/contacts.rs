//! Address books, contact resolution and organizer calendar credentials

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showup_common::{EmailValidator, FieldValidator, StringValidator, ValidationError};
use showup_core::CalendarCredential;
use showup_domain::{Contact, ContactResolution, ShowupError};

use super::SharedContext;
use crate::error::{ApiJson, ApiResult};
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Deserialize)]
pub struct ResolveContactsBody {
    pub account_id: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveContactsResponse {
    pub resolutions: Vec<ContactResolution>,
}

/// One address-book entry as uploaded by the client.
#[derive(Debug, Deserialize)]
pub struct ContactEntry {
    pub display_name: String,
    #[serde(default)]
    pub given_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportContactsBody {
    pub contacts: Vec<ContactEntry>,
}

#[derive(Debug, Serialize)]
pub struct ImportContactsResponse {
    pub account_id: String,
    pub stored: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveCredentialBody {
    pub account_id: String,
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// `POST /contacts/resolve`
pub async fn resolve_contacts(
    State(ctx): State<SharedContext>,
    ApiJson(body): ApiJson<ResolveContactsBody>,
) -> ApiResult<Json<ResolveContactsResponse>> {
    let resolutions =
        execute_command("contacts::resolve", ctx.resolver.resolve(&body.account_id, &body.tokens))
            .await?;
    Ok(Json(ResolveContactsResponse { resolutions }))
}

/// `GET /contacts/{account_id}`
pub async fn list_contacts(
    State(ctx): State<SharedContext>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts =
        execute_command("contacts::list", ctx.contacts.list_contacts(&account_id)).await?;
    Ok(Json(contacts))
}

/// `PUT /contacts/{account_id}`
///
/// Replaces the whole address book. Every entry is validated first; one bad
/// entry rejects the upload.
pub async fn import_contacts(
    State(ctx): State<SharedContext>,
    Path(account_id): Path<String>,
    ApiJson(body): ApiJson<ImportContactsBody>,
) -> ApiResult<Json<ImportContactsResponse>> {
    let contacts = validate_contacts(&account_id, body.contacts)?;
    let stored =
        execute_command("contacts::import", ctx.contacts.replace_contacts(&account_id, &contacts))
            .await?;
    Ok(Json(ImportContactsResponse { account_id, stored }))
}

/// `PUT /calendar/credentials`
pub async fn save_calendar_credential(
    State(ctx): State<SharedContext>,
    ApiJson(body): ApiJson<SaveCredentialBody>,
) -> ApiResult<StatusCode> {
    let mut errors = ValidationError::new();
    errors.check("account_id", body.account_id.as_str(), &EmailValidator::new());
    errors.check("access_token", body.access_token.as_str(), &StringValidator::new().not_empty());
    errors.into_result().map_err(|e| ShowupError::InvalidInput(e.to_string()))?;

    let credential = CalendarCredential {
        account_id: body.account_id.trim().to_string(),
        access_token: body.access_token,
        expires_at: body.expires_at,
    };
    execute_command("calendar::save_credential", ctx.credentials.save_credential(&credential))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_contacts(account_id: &str, entries: Vec<ContactEntry>) -> ApiResult<Vec<Contact>> {
    let email = EmailValidator::new();
    let name = StringValidator::new().not_empty().trim(true);

    let mut contacts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        name.validate(entry.display_name.as_str()).map_err(|e| {
            ShowupError::InvalidInput(format!("contacts[{index}].display_name: {e}"))
        })?;
        email
            .validate(entry.email.trim())
            .map_err(|e| ShowupError::InvalidInput(format!("contacts[{index}].email: {e}")))?;

        contacts.push(Contact {
            account_id: account_id.to_string(),
            display_name: entry.display_name,
            given_name: entry.given_name.filter(|g| !g.trim().is_empty()),
            email: entry.email,
        });
    }
    Ok(contacts)
}
