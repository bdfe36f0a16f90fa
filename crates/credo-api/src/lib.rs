//! Credo REST API
//!
//! This crate provides the Axum-based HTTP API for Credo: login, user
//! management, health and metrics, all answering with one JSON envelope.

pub mod audit;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use response::{Envelope, respond, respond_page};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle, MutationPolicy};
