//! Application state

use credo_auth::{BasicCredentials, TokenVerifier};
use credo_core::{AuthService, UserService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prometheus handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Who may call the user create, update and delete endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPolicy {
    /// Anyone
    #[default]
    Open,
    /// Callers presenting a valid bearer token
    Token,
}

impl MutationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationPolicy::Open => "open",
            MutationPolicy::Token => "token",
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub verifier: Arc<TokenVerifier>,
    pub basic: Arc<BasicCredentials>,
    pub mutation_policy: MutationPolicy,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        users: UserService,
        verifier: Arc<TokenVerifier>,
        basic: BasicCredentials,
        mutation_policy: MutationPolicy,
    ) -> Self {
        Self {
            auth,
            users,
            verifier,
            basic: Arc::new(basic),
            mutation_policy,
        }
    }
}
