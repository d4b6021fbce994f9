//! HTTP error mapping
//!
//! Every handler returns [`ApiResult`]; domain errors become a status code
//! plus a `{ "error": <label>, "message": <text> }` body.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use showup_domain::{ShowupError, WalletAddress};
use tracing::error;

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Domain error carried to the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub ShowupError);

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ShowupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ShowupError::Auth(_) => StatusCode::FORBIDDEN,
            ShowupError::NotFound(_) => StatusCode::NOT_FOUND,
            ShowupError::Conflict(_) => StatusCode::CONFLICT,
            ShowupError::Network(_) => StatusCode::BAD_GATEWAY,
            ShowupError::Database(_) | ShowupError::Config(_) | ShowupError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ShowupError> for ApiError {
    fn from(err: ShowupError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ShowupError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, label = self.0.label(), "request failed");
        }
        let body = ErrorBody { error: self.0.label().to_string(), message: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Parse a wallet address taken from a URL path segment.
pub fn parse_wallet(raw: &str) -> ApiResult<WalletAddress> {
    Ok(WalletAddress::parse(raw)?)
}
