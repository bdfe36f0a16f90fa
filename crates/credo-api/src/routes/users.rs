//! User management routes

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
    routing::get,
};
use credo_core::UserInput;
use tracing::debug;

use crate::error::ApiError;
use crate::response::{respond, respond_page};
use crate::state::AppState;

use super::auth::{RequireAuth, RequireBasic, RequireMutation};
use super::types::{UserListQuery, UserResponse};
use super::validation::{validate_password, validate_role, validate_username};

pub const GET_USER_MESSAGE: &str = "Get user success";
pub const ADD_USER_MESSAGE: &str = "Add user success";
pub const UPDATE_USER_MESSAGE: &str = "Update user success";
pub const DELETE_USER_MESSAGE: &str = "Delete User success";

/// GET /user
async fn list_users(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    query: Result<Query<UserListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter();
    let pagination = filter.pagination;

    debug!("Listing users for {}", caller.username);

    let outcome = state.users.get(filter).await.map(|completed| {
        completed.map(|users| users.into_iter().map(UserResponse::from).collect::<Vec<_>>())
    });
    Ok(respond_page(outcome, GET_USER_MESSAGE, &pagination))
}

/// GET /user/{username}
async fn get_user(
    _basic: RequireBasic,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let outcome = state.users.get_by_username(username).await;
    respond(outcome.map(|c| c.map(UserResponse::from)), GET_USER_MESSAGE)
}

/// POST /user
async fn create_user(
    _guard: RequireMutation,
    State(state): State<AppState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body?;
    validate_username(&input.username)?;
    validate_password(&input.password)?;
    validate_role(&input.role)?;

    debug!("Creating user: {}", input.username);

    let outcome = state.users.add(input).await;
    Ok(respond(outcome.map(|c| c.map(UserResponse::from)), ADD_USER_MESSAGE))
}

/// PUT /user/{username}
async fn update_user(
    _guard: RequireMutation,
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body?;
    validate_password(&input.password)?;
    validate_role(&input.role)?;

    debug!("Updating user: {}", username);

    let outcome = state.users.update(username, input).await;
    Ok(respond(outcome.map(|c| c.map(UserResponse::from)), UPDATE_USER_MESSAGE))
}

/// DELETE /user/{username}
async fn delete_user(
    _guard: RequireMutation,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    debug!("Deleting user: {}", username);

    respond(state.users.delete(username).await, DELETE_USER_MESSAGE)
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
