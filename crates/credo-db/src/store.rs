//! Storage seam used by the service layer

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewUser, User, UserFilter};
use crate::repository::Database;

/// User record storage
///
/// Implementations must be safe to share between concurrently running
/// operations. Lookups of a missing username fail with [`DbError::NotFound`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn add(&self, user: NewUser) -> Result<User, DbError>;

    async fn update(&self, user: &User) -> Result<User, DbError>;

    async fn delete(&self, username: &str) -> Result<(), DbError>;

    async fn find_by_username(&self, username: &str) -> Result<User, DbError>;

    /// Returns the requested page and the total number of matching users
    async fn find(&self, filter: &UserFilter) -> Result<(Vec<User>, i64), DbError>;
}

#[async_trait]
impl UserStore for Database {
    async fn add(&self, user: NewUser) -> Result<User, DbError> {
        self.insert_user(user).await
    }

    async fn update(&self, user: &User) -> Result<User, DbError> {
        self.update_user(user).await
    }

    async fn delete(&self, username: &str) -> Result<(), DbError> {
        if self.delete_user_by_username(username).await? {
            Ok(())
        } else {
            Err(DbError::NotFound(format!("User: {}", username)))
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DbError> {
        self.get_user_by_username(username)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", username)))
    }

    async fn find(&self, filter: &UserFilter) -> Result<(Vec<User>, i64), DbError> {
        self.list_users(filter).await
    }
}
