//! Store vs. external ledger audits

use axum::extract::{Path, State};
use axum::Json;
use showup_core::StakeVerification;
use showup_domain::ReconciliationReport;

use super::SharedContext;
use crate::error::{parse_wallet, ApiResult};
use crate::utils::command_helpers::execute_command;

/// `GET /meetings/{meeting_id}/reconciliation`
pub async fn reconcile_meeting(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Json<ReconciliationReport>> {
    let report =
        execute_command("reconcile::reconcile", ctx.reconciler.reconcile(&meeting_id)).await?;
    Ok(Json(report))
}

/// `GET /meetings/{meeting_id}/stakes/{wallet}/verification`
pub async fn verify_stake(
    State(ctx): State<SharedContext>,
    Path((meeting_id, wallet)): Path<(String, String)>,
) -> ApiResult<Json<StakeVerification>> {
    let wallet = parse_wallet(&wallet)?;
    let verification = execute_command(
        "reconcile::verify_stake",
        ctx.reconciler.verify_stake(&meeting_id, &wallet),
    )
    .await?;
    Ok(Json(verification))
}
