//! Stake posting

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use showup_core::{PostStakeRequest, StakeReceipt};
use showup_domain::{StakeAmount, WalletAddress};

use super::SharedContext;
use crate::error::{ApiJson, ApiResult};
use crate::utils::command_helpers::execute_command;

#[derive(Debug, Deserialize)]
pub struct PostStakeBody {
    pub wallet_address: WalletAddress,
    /// Ether string, e.g. `"0.01"`
    pub amount: StakeAmount,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub invitation_token: Option<String>,
}

/// `POST /meetings/{meeting_id}/stakes`
pub async fn post_stake(
    State(ctx): State<SharedContext>,
    Path(meeting_id): Path<String>,
    ApiJson(body): ApiJson<PostStakeBody>,
) -> ApiResult<(StatusCode, Json<StakeReceipt>)> {
    let request = PostStakeRequest {
        meeting_id,
        wallet_address: body.wallet_address,
        amount: body.amount,
        email: body.email,
        invitation_token: body.invitation_token,
    };
    let receipt =
        execute_command("stakes::post_stake", ctx.stake_ledger.post_stake(request)).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
