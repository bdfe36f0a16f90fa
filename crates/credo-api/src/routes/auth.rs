//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::{header::AUTHORIZATION, request::Parts},
    response::Response,
    routing::post,
};
use credo_auth::{AuthError, AuthUser, extract_bearer_token};
use credo_core::LoginRequest;
use tracing::debug;

use crate::error::ApiError;
use crate::response::respond;
use crate::state::{AppState, MutationPolicy};

use super::validation::validate_login;

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login success";

fn authorization_header(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)
}

// ==================== Auth Extractors ====================

/// Extractor for a caller holding a valid bearer token
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_bearer_token(authorization_header(parts)?)?;
        let claims = app_state.verifier.authenticate(token)?;
        let user = AuthUser::from_claims(&claims);

        debug!("Authenticated user: {} ({})", user.username, user.role);
        Ok(RequireAuth(user))
    }
}

/// Extractor for a caller presenting the configured basic-auth pair
pub struct RequireBasic;

impl<S> FromRequestParts<S> for RequireBasic
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        app_state
            .basic
            .verify_header(authorization_header(parts)?)
            .inspect_err(|e| debug!("Basic auth rejected: {}", e))?;
        Ok(RequireBasic)
    }
}

/// Extractor enforcing the configured [`MutationPolicy`]
///
/// Holds the authenticated user when the policy requires a token.
pub struct RequireMutation(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for RequireMutation
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        match app_state.mutation_policy {
            MutationPolicy::Open => Ok(RequireMutation(None)),
            MutationPolicy::Token => {
                let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
                Ok(RequireMutation(Some(user)))
            }
        }
    }
}

// ==================== Auth Routes ====================

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    validate_login(&request.username, &request.password)?;

    Ok(respond(state.auth.login(request).await, LOGIN_SUCCESS_MESSAGE))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}
