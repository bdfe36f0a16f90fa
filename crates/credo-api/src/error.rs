//! API error types

use std::any::Any;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use credo_auth::AuthError;
use credo_core::ServiceError;
use credo_core::error::{BIND_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use thiserror::Error;
use tracing::{debug, error};

use crate::response::Envelope;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A classified failure; its message reaches the client verbatim
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request body or query could not be decoded
    #[error("Failed to bind request: {0}")]
    Bind(String),

    /// Anything outside the taxonomy
    #[error("Unclassified error: {0}")]
    Unclassified(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Service(ServiceError::bad_request(message))
    }

    pub fn unclassified(err: impl std::fmt::Display) -> Self {
        ApiError::Unclassified(err.to_string())
    }

    /// Status code and client-facing message
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Service(e) => (
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.message().to_string(),
            ),
            ApiError::Bind(_) => (StatusCode::BAD_REQUEST, BIND_ERROR_MESSAGE.to_string()),
            ApiError::Unclassified(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UNKNOWN_ERROR_MESSAGE.to_string(),
            ),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Service(ServiceError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Bind(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Bind(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Service(e) => {
                if let Some(detail) = e.detail() {
                    error!("Internal error: {}", detail);
                }
            }
            ApiError::Bind(reason) => debug!("Rejected request body: {}", reason),
            ApiError::Unclassified(reason) => error!("Unclassified error: {}", reason),
        }

        let (status, message) = self.status_and_message();
        Envelope::<()>::failure(status, message).into_response()
    }
}

/// Response for a handler that panicked
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };
    ApiError::unclassified(format!("handler panicked: {}", reason)).into_response()
}
