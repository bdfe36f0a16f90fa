//! Request/Response DTOs

use credo_db::{PaginationRequest, User, UserFilter};
use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /user`
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub disable_pagination: Option<bool>,
}

impl UserListQuery {
    /// Convert into a store filter with default pagination applied
    pub fn into_filter(self) -> UserFilter {
        let pagination = PaginationRequest {
            page: self.page.unwrap_or_default(),
            per_page: self.per_page.unwrap_or_default(),
            disable_pagination: self.disable_pagination.unwrap_or(false),
        };
        UserFilter {
            role: self.role,
            pagination: pagination.with_defaults(),
        }
    }
}

/// User response (without password)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}
