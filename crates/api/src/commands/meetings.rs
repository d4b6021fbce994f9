//! Meeting proposal, scheduling and cancellation

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use showup_core::{MeetingOverview, ProposalOutcome, ProposeMeetingRequest};
use showup_domain::{MeetingStake, PendingMeeting};

use super::{RequestedBy, SharedContext};
use crate::error::{ApiJson, ApiResult};
use crate::utils::command_helpers::execute_command;

/// `POST /meetings`
///
/// `201` with the stored meeting, or `200` with the disambiguation groups
/// when some attendee could not be resolved (nothing is stored then).
pub async fn propose_meeting(
    State(ctx): State<SharedContext>,
    ApiJson(request): ApiJson<ProposeMeetingRequest>,
) -> ApiResult<(StatusCode, Json<ProposalOutcome>)> {
    let outcome = execute_command("meetings::propose", ctx.scheduler.propose(request)).await?;
    let status = match outcome {
        ProposalOutcome::Created { .. } => StatusCode::CREATED,
        ProposalOutcome::NeedsDisambiguation { .. } => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

/// `GET /meetings/{meeting_id}`
pub async fn get_meeting(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Json<MeetingOverview>> {
    let overview = execute_command("meetings::get", ctx.scheduler.get(&meeting_id)).await?;
    Ok(Json(overview))
}

/// `POST /meetings/{meeting_id}/schedule`
pub async fn schedule_meeting(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<RequestedBy>,
) -> ApiResult<Json<MeetingStake>> {
    let meeting = execute_command(
        "meetings::schedule",
        ctx.scheduler.schedule(&meeting_id, &body.requested_by),
    )
    .await?;
    Ok(Json(meeting))
}

/// `POST /meetings/{meeting_id}/cancel`
pub async fn cancel_meeting(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<RequestedBy>,
) -> ApiResult<Json<PendingMeeting>> {
    let meeting =
        execute_command("meetings::cancel", ctx.scheduler.cancel(&meeting_id, &body.requested_by))
            .await?;
    Ok(Json(meeting))
}
