//! Attendance codes, check-in and settlement

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use showup_domain::{AttendanceCode, CheckInOutcome, SettlementSummary, WalletAddress};

use super::{RequestedBy, SharedContext};
use crate::error::{ApiJson, ApiResult};
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Deserialize)]
pub struct SubmitCodeBody {
    pub code: String,
    pub wallet_address: WalletAddress,
}

/// `POST /meetings/{meeting_id}/attendance-code`
pub async fn generate_code(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<RequestedBy>,
) -> ApiResult<Json<AttendanceCode>> {
    let code = execute_command(
        "attendance::generate_code",
        ctx.attendance.generate_code(&meeting_id, &body.requested_by),
    )
    .await?;
    Ok(Json(code))
}

/// `POST /meetings/{meeting_id}/check-in`
pub async fn submit_code(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<SubmitCodeBody>,
) -> ApiResult<Json<CheckInOutcome>> {
    let outcome = execute_command(
        "attendance::submit_code",
        ctx.attendance.submit_code(&meeting_id, &body.code, &body.wallet_address),
    )
    .await?;
    Ok(Json(outcome))
}

/// `POST /meetings/{meeting_id}/settle`
pub async fn settle_meeting(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Json<SettlementSummary>> {
    let summary = execute_command("settlement::settle", ctx.settlement.settle(&meeting_id)).await?;
    Ok(Json(summary))
}
