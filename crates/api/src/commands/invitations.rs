//! Invitation tokens and wallet/e-mail associations

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use showup_domain::{InvitationToken, WalletAddress, WalletEmailAssociation};

use super::SharedContext;
use crate::error::{parse_wallet, ApiJson, ApiResult};
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Deserialize)]
pub struct IssueInvitationBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemInvitationBody {
    pub wallet_address: WalletAddress,
}

/// `POST /meetings/{meeting_id}/invitations`
pub async fn issue_invitation(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<IssueInvitationBody>,
) -> ApiResult<(StatusCode, Json<InvitationToken>)> {
    let invitation =
        execute_command("invitations::issue", ctx.invitations.issue(&meeting_id, &body.email))
            .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// `GET /meetings/{meeting_id}/invitations`
pub async fn list_invitations(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Json<Vec<InvitationToken>>> {
    let invitations =
        execute_command("invitations::list", ctx.invitations.list_for_meeting(&meeting_id)).await?;
    Ok(Json(invitations))
}

/// `GET /invitations/{token}`
pub async fn get_invitation(
    State(ctx): State<SharedContext>,
    Path(token): Path<String>,
) -> ApiResult<Json<InvitationToken>> {
    let invitation = execute_command("invitations::get", ctx.invitations.get(&token)).await?;
    Ok(Json(invitation))
}

/// `POST /invitations/{token}/redeem`
pub async fn redeem_invitation(
    State(ctx): State<SharedContext>,
    Path(token): Path<String>,
    ApiJson(body): ApiJson<RedeemInvitationBody>,
) -> ApiResult<Json<WalletEmailAssociation>> {
    let association = execute_command(
        "invitations::redeem",
        ctx.invitations.redeem(&token, &body.wallet_address),
    )
    .await?;
    Ok(Json(association))
}

/// `GET /wallets/{wallet}/associations`
pub async fn wallet_associations(
    State(ctx): State<SharedContext>,
    Path(wallet): Path<String>,
) -> ApiResult<Json<Vec<WalletEmailAssociation>>> {
    let wallet = parse_wallet(&wallet)?;
    let associations = execute_command(
        "invitations::associations_for_wallet",
        ctx.invitations.associations_for_wallet(&wallet),
    )
    .await?;
    Ok(Json(associations))
}
