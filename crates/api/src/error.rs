//! Error responses.
//!
//! Every failure leaves the API as `{ "error": <code>, "message": <text> }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::auth::AuthError;
use tally_core::ledger::LedgerError;
use tally_db::{AccountError, UserError};
use tally_shared::AppError;
use tracing::error;

/// An error ready to be rendered as a JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Snake-case error code.
    pub code: &'static str,
    /// Human readable message.
    pub message: String,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 401 with the given code.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// Opaque 500; the cause is logged, not returned.
    pub fn internal(context: &str, cause: &dyn std::fmt::Display) -> Self {
        error!(error = %cause, "{context}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred",
        )
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Database(_) | AppError::Internal(_) => Self::internal("Request failed", &err),
            _ => Self::new(status_from(err.status_code()), err.error_code(), err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        if err.http_status_code() >= 500 {
            return Self::internal("Ledger operation failed", &err);
        }
        Self::new(
            status_from(err.http_status_code()),
            err.error_code(),
            err.to_string(),
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        LedgerError::from(err).into()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        AppError::from(err).into()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        AppError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}
