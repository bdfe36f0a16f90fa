//! Password login

use std::sync::Arc;

use credo_auth::{CredentialHasher, IssuedToken, TokenIssuer};
use credo_db::UserStore;
use serde::Deserialize;
use tracing::{debug, error, info};
use zeroize::Zeroize;

use crate::error::ServiceError;
use crate::execution::{Pending, dispatch};
use crate::outcome::{Completed, Outcome};

/// Plaintext used to build the digest checked for unknown usernames
const DUMMY_PASSWORD: &str = "timing-attack-prevention";

/// Login credentials
///
/// The password is wiped from memory when the request is dropped.
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Drop for LoginRequest {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Verifies credentials and issues access tokens
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<TokenIssuer>,
    dummy_digest: Arc<str>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Result<Self, ServiceError> {
        // Unknown usernames are checked against this digest so that both
        // rejection paths cost one hash verification
        let dummy_digest = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            hasher,
            issuer,
            dummy_digest: dummy_digest.into(),
        })
    }

    /// Log in with a username and password
    pub fn login(&self, request: LoginRequest) -> Pending<IssuedToken> {
        let service = self.clone();
        dispatch("login", async move {
            let outcome = service.authenticate(&request).await;
            let label = match &outcome {
                Ok(_) => "success",
                Err(e) if e.status_code() < 500 => "rejected",
                Err(_) => "error",
            };
            metrics::counter!("credo_login_attempts_total", "outcome" => label).increment(1);
            outcome
        })
    }

    async fn authenticate(&self, request: &LoginRequest) -> Outcome<IssuedToken> {
        debug!("Login attempt for user: {}", request.username);

        let user = match self.store.find_by_username(&request.username).await {
            Ok(user) => Some(user),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                error!("User lookup failed during login: {}", e);
                return Err(ServiceError::from_store(e, ServiceError::invalid_login));
            }
        };

        let digest = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(&self.dummy_digest);
        let password_valid = self.hasher.verify(&request.password, digest);

        let user = match user {
            Some(u) if password_valid && u.username == request.username => u,
            _ => return Err(ServiceError::invalid_login()),
        };

        let token = self
            .issuer
            .issue(user.id, &user.username, &user.role)
            .map_err(|e| {
                error!("Failed to sign access token: {}", e);
                ServiceError::from(e)
            })?;

        info!("User {} logged in successfully", user.username);
        Ok(Completed::new(token))
    }
}
