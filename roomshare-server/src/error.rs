//! Service error types

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification code expired")]
    VerificationExpired,

    /// A multi-document update stopped half way
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        MarketError::Internal(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
            MarketError::InvalidState(_)
            | MarketError::InvalidOperation(_)
            | MarketError::Validation(_)
            | MarketError::InvalidVerificationCode
            | MarketError::VerificationExpired => StatusCode::BAD_REQUEST,
            MarketError::Conflict(_) => StatusCode::CONFLICT,
            MarketError::NotAuthenticated | MarketError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            MarketError::Inconsistent(_) | MarketError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<roomshare_core::Error> for MarketError {
    fn from(err: roomshare_core::Error) -> Self {
        match err {
            roomshare_core::Error::InvalidId(_) => MarketError::Validation("Invalid id".to_string()),
            other => MarketError::Validation(other.to_string()),
        }
    }
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        MarketError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for MarketError {
    fn from(rejection: QueryRejection) -> Self {
        MarketError::Validation(rejection.body_text())
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            MarketError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            MarketError::Inconsistent(msg) => {
                tracing::error!("Inconsistent state, manual reconciliation required: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}
