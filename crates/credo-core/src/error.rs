//! Classified service errors
//!
//! Every failure that leaves the service layer is a [`ServiceError`] with a
//! kind from a closed set. The kind picks the HTTP status; the message is
//! what the client sees. Operator-only context goes in `detail`, which is
//! logged and never serialized.

use credo_auth::AuthError;
use credo_db::DbError;
use thiserror::Error;

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const NOT_FOUND_MESSAGE: &str = "Data not found";
pub const BIND_ERROR_MESSAGE: &str = "Failed to bind request";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown Error";

/// Closed set of error classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Message used when the caller supplies none
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => UNAUTHORIZED_MESSAGE,
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// A classified error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    detail: Option<String>,
}

impl ServiceError {
    /// Create an error; an empty message falls back to the kind's default
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.default_message().to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Internal failure; `detail` is kept for the logs only
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            detail: Some(detail.into()),
        }
    }

    /// The rejection returned for any failed login
    pub fn invalid_login() -> Self {
        Self::unauthorized(INVALID_LOGIN_MESSAGE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Classify a storage failure
    ///
    /// Missing records become `on_missing`, because what "not found" means
    /// depends on the caller: a failed login must not reveal which usernames
    /// exist.
    pub fn from_store(err: DbError, on_missing: impl FnOnce() -> ServiceError) -> Self {
        if err.is_not_found() {
            return on_missing();
        }
        match err {
            DbError::Duplicate(msg) => Self::conflict(msg),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            Self::unauthorized(UNAUTHORIZED_MESSAGE)
        } else {
            Self::internal(err.to_string())
        }
    }
}
