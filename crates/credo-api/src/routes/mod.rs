//! API routes

mod auth;
mod health;
pub mod metrics;
mod types;
mod users;
mod validation;


use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Router, middleware};
use credo_core::ServiceError;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

use crate::audit::audit;
use crate::error::{ApiError, panic_response};
use crate::response::{Envelope, envelope_bare_failures};
use crate::state::{AppState, MetricsHandle};

pub use auth::{RequireAuth, RequireBasic, RequireMutation};
pub use types::{UserListQuery, UserResponse};

/// Envelope for paths no route matches
async fn not_found() -> ApiError {
    ApiError::from(ServiceError::not_found(""))
}

/// Envelope for known paths called with an unsupported method
async fn method_not_allowed() -> impl IntoResponse {
    Envelope::<()>::failure(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Create the main router
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<MetricsHandle>>,
    request_timeout: Duration,
) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(users::routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    with_edge_layers(router, request_timeout)
}

/// Edge layers, innermost first
///
/// Audit must stay outermost to record timed out and panicking requests.
fn with_edge_layers(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(envelope_bare_failures))
        .layer(middleware::from_fn(audit))
}
