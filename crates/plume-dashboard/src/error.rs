//! HTTP error responses
//!
//! Every failure leaves the service as a notification body, the same shape a
//! successful flow returns.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plume_common::error::LoanError;
use plume_common::Notification;

/// Status code plus user-facing notification
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub notification: Notification,
}

impl ApiError {
    pub fn new(status: StatusCode, notification: Notification) -> Self {
        Self { status, notification }
    }

    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, Notification::error("Invalid request", description))
    }

    /// Upstream node or API failure
    pub fn upstream(message: &str, err: &dyn std::fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            Notification::from_error(message, err, "Something went wrong"),
        )
    }
}

impl From<LoanError> for ApiError {
    fn from(err: LoanError) -> Self {
        let status = match err {
            LoanError::LoanNotFound { .. } => StatusCode::NOT_FOUND,
            LoanError::LoanNotActive { .. } => StatusCode::CONFLICT,
            LoanError::WalletNotConnected => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, Notification::error("Invalid request", err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.notification)).into_response()
    }
}
