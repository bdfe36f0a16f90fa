//! Shared fixtures for service tests

use std::sync::Arc;

use credo_auth::{Argon2Hasher, CredentialHasher, TokenIssuer, TokenVerifier};
use credo_db::{Database, User, UserStore};

use crate::auth::AuthService;
use crate::error::ServiceError;
use crate::execution::Pending;
use crate::users::{UserInput, UserService};

const PRIVATE_KEY: &[u8] = include_bytes!("../../credo-auth/testdata/private_rsa_key.pem");
const PUBLIC_KEY: &[u8] = include_bytes!("../../credo-auth/testdata/public_rsa_key.pem");

pub(crate) struct TestContext {
    pub auth: AuthService,
    pub users: UserService,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl TestContext {
    pub async fn new() -> Self {
        let store: Arc<dyn UserStore> = Arc::new(Database::in_memory().await.unwrap());
        // Minimal cost keeps hashing fast in tests
        let hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap());
        let issuer = Arc::new(TokenIssuer::from_rsa_pem(PRIVATE_KEY).unwrap());

        Self {
            auth: AuthService::new(store.clone(), hasher.clone(), issuer).unwrap(),
            users: UserService::new(store, hasher.clone()),
            hasher,
        }
    }

    pub async fn create_user(&self, username: &str, password: &str, role: &str) -> User {
        data(self.users.add(UserInput::new(username, password, role)))
            .await
            .unwrap()
    }
}

pub(crate) fn verifier() -> TokenVerifier {
    TokenVerifier::from_rsa_pem(PUBLIC_KEY).unwrap()
}

/// Await an operation and keep only its payload
pub(crate) async fn data<T>(pending: Pending<T>) -> Result<T, ServiceError> {
    pending.await.map(|completed| completed.data)
}
