//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Whether the error is caused by the caller rather than by the server
    ///
    /// Key and hashing failures are server faults; everything else is a
    /// rejected credential.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::InvalidKey(_) | AuthError::PasswordHash(_) | AuthError::Jwt(_)
        )
    }
}
