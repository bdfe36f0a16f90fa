//! Health check endpoint

use axum::{Router, routing::get};
use tracing::debug;

use crate::response::Envelope;
use crate::state::AppState;

pub const HEALTH_MESSAGE: &str = "This service is running properly";

/// Health check handler
async fn health() -> Envelope<()> {
    metrics::counter!("credo_health_checks_total").increment(1);
    debug!("{}", HEALTH_MESSAGE);

    Envelope::new(axum::http::StatusCode::OK, None, HEALTH_MESSAGE)
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/health-check", get(health))
}
