//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User, UserFilter};
use crate::repository::Database;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

impl Database {
    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let existing = self.get_user_by_username(&user.username).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.username)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent insert of the same username
            if is_unique_violation(&e) {
                DbError::Duplicate(format!("User '{}' already exists", user.username))
            } else {
                DbError::from(e)
            }
        })?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List users matching a filter, returning the page and the total match count
    pub async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64), DbError> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(role) = filter.role() {
            conditions.push("role = ?");
            params.push(role.to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM users {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("count");

        let pagination = &filter.pagination;
        let limit_clause = if pagination.disable_pagination {
            ""
        } else {
            "LIMIT ? OFFSET ?"
        };

        let sql = format!(
            "SELECT {} FROM users {} ORDER BY id ASC {}",
            USER_COLUMNS, where_clause, limit_clause
        );
        let mut users_query = sqlx::query(&sql);
        for param in &params {
            users_query = users_query.bind(param);
        }
        if !pagination.disable_pagination {
            users_query = users_query.bind(pagination.limit()).bind(pagination.offset());
        }

        let rows = users_query.fetch_all(&self.pool).await?;
        let users: Result<Vec<User>, _> = rows
            .iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect();

        Ok((users?, total))
    }

    /// Update the mutable fields of a user, keyed by username
    pub async fn update_user(&self, user: &User) -> Result<User, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, role = ?, updated_at = ?
            WHERE username = ?
            "#,
        )
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(now.to_rfc3339())
        .bind(&user.username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User: {}", user.username)));
        }

        self.get_user_by_username(&user.username)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", user.username)))
    }

    /// Delete a user by username
    pub async fn delete_user_by_username(&self, username: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
