//! Credo Core Business Logic
//!
//! This crate provides the login and user management operations behind the
//! Credo API. Every operation runs on its own task and hands back a
//! [`Pending`] handle that resolves to exactly one [`Outcome`].

pub mod auth;
pub mod error;
pub mod execution;
pub mod outcome;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthService, LoginRequest};
pub use error::{ErrorKind, ServiceError};
pub use execution::{Pending, dispatch};
pub use outcome::{Completed, Outcome};
pub use users::{UserInput, UserService};
