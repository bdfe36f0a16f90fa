//! Credo Database Layer
//!
//! This crate provides user storage for Credo, using SQLite via sqlx
//! for persistence.

pub mod error;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use models::*;
pub use pagination::{PaginationMeta, PaginationRequest};
pub use repository::Database;
pub use store::UserStore;
