//! Health check route

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::SharedContext;
use crate::utils::health::HealthStatus;

/// `GET /health`
///
/// Responds `200` while the store answers queries and `503` otherwise.
///
/// # Example Response
/// ```json
/// {
///   "is_healthy": true,
///   "version": "0.1.0",
///   "components": [
///     { "name": "database", "state": "up" },
///     { "name": "email", "state": "disabled" },
///     { "name": "ledger", "state": "up" }
///   ],
///   "checked_at": "2025-05-20T16:00:00Z"
/// }
/// ```
pub async fn get_app_health(State(ctx): State<SharedContext>) -> (StatusCode, Json<HealthStatus>) {
    let status = ctx.health_check().await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
