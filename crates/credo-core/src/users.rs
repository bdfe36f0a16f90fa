//! User management operations

use std::sync::Arc;

use credo_auth::CredentialHasher;
use credo_db::{NewUser, User, UserFilter, UserStore};
use serde::Deserialize;
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::error::{NOT_FOUND_MESSAGE, ServiceError};
use crate::execution::{Pending, dispatch};
use crate::outcome::Completed;

/// User fields supplied on create and update
#[derive(Deserialize, Default)]
pub struct UserInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl UserInput {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }
}

impl Drop for UserInput {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl std::fmt::Debug for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInput")
            .field("username", &self.username)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

fn not_found() -> ServiceError {
    ServiceError::not_found(NOT_FOUND_MESSAGE)
}

/// Create, read, update and delete users
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// Create a user, hashing the supplied password
    pub fn add(&self, input: UserInput) -> Pending<User> {
        let service = self.clone();
        dispatch("add_user", async move {
            let password_hash = service.hasher.hash(&input.password)?;
            let user = service
                .store
                .add(NewUser {
                    username: input.username.clone(),
                    password_hash,
                    role: input.role.clone(),
                })
                .await
                .map_err(|e| ServiceError::from_store(e, not_found))?;

            info!("Created user: {}", user.username);
            Ok(Completed::new(user))
        })
    }

    /// List users matching a filter
    pub fn get(&self, filter: UserFilter) -> Pending<Vec<User>> {
        let service = self.clone();
        dispatch("get_users", async move {
            let (users, total) = service
                .store
                .find(&filter)
                .await
                .map_err(|e| ServiceError::from_store(e, not_found))?;
            Ok(Completed::with_total(users, total))
        })
    }

    /// Look up a single user
    pub fn get_by_username(&self, username: String) -> Pending<User> {
        let service = self.clone();
        dispatch("get_user_by_username", async move {
            service.find(&username).await.map(Completed::new)
        })
    }

    /// Replace a user's password and role
    ///
    /// The username is fixed at creation. The stored digest is kept when the
    /// supplied password already matches it.
    pub fn update(&self, username: String, input: UserInput) -> Pending<User> {
        let service = self.clone();
        dispatch("update_user", async move {
            let mut user = service.find(&username).await?;

            if !input.username.is_empty() && input.username != user.username {
                return Err(ServiceError::bad_request("Username cannot be changed"));
            }

            if !service.hasher.verify(&input.password, &user.password_hash) {
                debug!("Password changed for user: {}", user.username);
                user.password_hash = service.hasher.hash(&input.password)?;
            }
            user.role = input.role.clone();

            let user = service
                .store
                .update(&user)
                .await
                .map_err(|e| ServiceError::from_store(e, not_found))?;

            info!("Updated user: {}", user.username);
            Ok(Completed::new(user))
        })
    }

    /// Delete a user
    pub fn delete(&self, username: String) -> Pending<()> {
        let service = self.clone();
        dispatch("delete_user", async move {
            service
                .store
                .delete(&username)
                .await
                .map_err(|e| ServiceError::from_store(e, not_found))?;

            info!("Deleted user: {}", username);
            Ok(Completed::new(()))
        })
    }

    async fn find(&self, username: &str) -> Result<User, ServiceError> {
        self.store
            .find_by_username(username)
            .await
            .map_err(|e| ServiceError::from_store(e, not_found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{TestContext, data};
    use credo_db::PaginationRequest;

    #[tokio::test]
    async fn test_add_hashes_password() {
        let ctx = TestContext::new().await;
        let user = data(ctx.users.add(UserInput::new("alice", "wonderland", "admin")))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.role, "admin");
        assert_ne!(user.password_hash, "wonderland");
        assert!(ctx.hasher.verify("wonderland", &user.password_hash));
    }

    #[tokio::test]
    async fn test_add_duplicate_is_conflict() {
        let ctx = TestContext::new().await;
        ctx.create_user("alice", "wonderland", "admin").await;

        let err = data(ctx.users.add(UserInput::new("alice", "other", "member")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_get_by_username_not_found() {
        let ctx = TestContext::new().await;
        let err = data(ctx.users.get_by_username("ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_get_paginated_listing() {
        let ctx = TestContext::new().await;
        for i in 0..25 {
            ctx.create_user(&format!("user{:02}", i), "pw", "member").await;
        }

        let filter = UserFilter {
            role: None,
            pagination: PaginationRequest::new(1, 10),
        };
        let page = ctx.users.get(filter).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, Some(25));

        let filter = UserFilter {
            role: None,
            pagination: PaginationRequest::new(3, 10),
        };
        let page = ctx.users.get(filter).await.unwrap();
        assert_eq!(page.data.len(), 5);

        let filter = UserFilter {
            role: None,
            pagination: PaginationRequest::disabled(),
        };
        let page = ctx.users.get(filter).await.unwrap();
        assert_eq!(page.data.len(), 25);
    }

    #[tokio::test]
    async fn test_update_changes_role_and_password() {
        let ctx = TestContext::new().await;
        let original = ctx.create_user("alice", "wonderland", "member").await;

        let updated = data(ctx.users.update(
            "alice".to_string(),
            UserInput::new("alice", "looking-glass", "admin"),
        ))
        .await
        .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.role, "admin");
        assert!(ctx.hasher.verify("looking-glass", &updated.password_hash));
        assert!(!ctx.hasher.verify("wonderland", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_keeps_digest_for_same_password() {
        let ctx = TestContext::new().await;
        let original = ctx.create_user("alice", "wonderland", "member").await;

        let updated = data(ctx.users.update(
            "alice".to_string(),
            UserInput::new("", "wonderland", "admin"),
        ))
        .await
        .unwrap();

        assert_eq!(updated.password_hash, original.password_hash);
        assert_eq!(updated.role, "admin");
    }

    #[tokio::test]
    async fn test_update_cannot_rename() {
        let ctx = TestContext::new().await;
        ctx.create_user("alice", "wonderland", "member").await;

        let err = data(ctx.users.update(
            "alice".to_string(),
            UserInput::new("bob", "wonderland", "member"),
        ))
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let ctx = TestContext::new().await;
        let err = data(ctx.users.update(
            "ghost".to_string(),
            UserInput::new("ghost", "pw", "member"),
        ))
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete() {
        let ctx = TestContext::new().await;
        ctx.create_user("alice", "wonderland", "member").await;

        data(ctx.users.delete("alice".to_string())).await.unwrap();

        let err = data(ctx.users.delete("alice".to_string())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
