//! HTTP routes, one module per command group

pub mod attendance;
pub mod contacts;
pub mod health;
pub mod invitations;
pub mod meetings;
pub mod reconcile;
pub mod stakes;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;
use showup_domain::WalletAddress;

use crate::context::AppContext;

/// Shared state handed to every handler.
pub type SharedContext = Arc<AppContext>;

/// Body for organizer-only actions.
#[derive(Debug, Deserialize)]
pub struct RequestedBy {
    pub requested_by: WalletAddress,
}

/// Build the application router.
pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/health", get(health::get_app_health))
        .route("/meetings", post(meetings::propose_meeting))
        .route("/meetings/{meeting_id}", get(meetings::get_meeting))
        .route("/meetings/{meeting_id}/schedule", post(meetings::schedule_meeting))
        .route("/meetings/{meeting_id}/cancel", post(meetings::cancel_meeting))
        .route("/meetings/{meeting_id}/stakes", post(stakes::post_stake))
        .route("/meetings/{meeting_id}/attendance-code", post(attendance::generate_code))
        .route("/meetings/{meeting_id}/check-in", post(attendance::submit_code))
        .route("/meetings/{meeting_id}/settle", post(attendance::settle_meeting))
        .route(
            "/meetings/{meeting_id}/invitations",
            get(invitations::list_invitations).post(invitations::issue_invitation),
        )
        .route("/meetings/{meeting_id}/reconciliation", get(reconcile::reconcile_meeting))
        .route(
            "/meetings/{meeting_id}/stakes/{wallet}/verification",
            get(reconcile::verify_stake),
        )
        .route("/invitations/{token}", get(invitations::get_invitation))
        .route("/invitations/{token}/redeem", post(invitations::redeem_invitation))
        .route("/wallets/{wallet}/associations", get(invitations::wallet_associations))
        .route("/contacts/resolve", post(contacts::resolve_contacts))
        .route(
            "/contacts/{account_id}",
            get(contacts::list_contacts).put(contacts::import_contacts),
        )
        .route("/calendar/credentials", put(contacts::save_calendar_credential))
        .with_state(ctx)
}
