//! Input validation shared by the handlers

use crate::error::ApiError;

/// Maximum allowed username length
pub const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum length for newly set passwords
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed role length
pub const MAX_ROLE_LENGTH: usize = 32;

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(())
}

fn at_most(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.len() > max {
        return Err(ApiError::bad_request(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Login fields only need to be present and bounded
pub fn validate_login(username: &str, password: &str) -> Result<(), ApiError> {
    required("Username", username)?;
    required("Password", password)?;
    at_most("Username", username, MAX_USERNAME_LENGTH)?;
    at_most("Password", password, MAX_PASSWORD_LENGTH)
}

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    required("Username", username)?;
    at_most("Username", username, MAX_USERNAME_LENGTH)?;
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::bad_request(
            "Username can only contain alphanumeric characters, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Validate a password being stored
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    required("Password", password)?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    at_most("Password", password, MAX_PASSWORD_LENGTH)
}

pub fn validate_role(role: &str) -> Result<(), ApiError> {
    required("Role", role)?;
    at_most("Role", role, MAX_ROLE_LENGTH)
}
