//! Credo Authentication
//!
//! This crate provides password hashing, RS256 access tokens and the
//! authorization header guards used by the Credo API.

pub mod error;
pub mod guard;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use guard::{AuthUser, BasicCredentials, extract_bearer_token};
pub use jwt::{ACCESS_TOKEN_TTL_SECS, Claims, IssuedToken, TOKEN_TYPE, TokenIssuer, TokenVerifier};
pub use password::{Argon2Hasher, CredentialHasher};
