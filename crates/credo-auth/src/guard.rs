//! Authorization header parsing

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::AuthError;
use crate::jwt::Claims;

/// Authenticated user information, taken from token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.parse().unwrap_or(0),
            username: claims.username.clone(),
            role: claims.role.clone(),
        }
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Fixed username/password pair accepted through HTTP basic auth
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Check an `Authorization: Basic ...` header value
    pub fn verify_header(&self, header: &str) -> Result<(), AuthError> {
        let encoded = header
            .strip_prefix("Basic ")
            .ok_or(AuthError::InvalidAuthHeader)?;
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| AuthError::InvalidAuthHeader)?,
        );
        let decoded = std::str::from_utf8(&decoded).map_err(|_| AuthError::InvalidAuthHeader)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::InvalidAuthHeader)?;

        if username == self.username && password == self.password.as_str() {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("abc.def.ghi").is_err());
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims {
            sub: "12".to_string(),
            username: "alice".to_string(),
            role: "admin".to_string(),
            iat: 0,
            exp: 0,
        };
        let user = AuthUser::from_claims(&claims);
        assert_eq!(user.id, 12);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn test_basic_credentials_accepted() {
        let creds = BasicCredentials::new("ops", "s3cret:with:colons");
        assert!(creds.verify_header(&basic("ops", "s3cret:with:colons")).is_ok());
    }

    #[test]
    fn test_basic_credentials_rejected() {
        let creds = BasicCredentials::new("ops", "s3cret");
        assert!(matches!(
            creds.verify_header(&basic("ops", "wrong")),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            creds.verify_header(&basic("other", "s3cret")),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            creds.verify_header("Basic !!!not-base64"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            creds.verify_header("Bearer token"),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = BasicCredentials::new("ops", "s3cret");
        assert!(!format!("{:?}", creds).contains("s3cret"));
    }
}
