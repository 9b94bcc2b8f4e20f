//! Registered API users (credentials for the token endpoints).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use catalog_core::UserId;

use crate::store::{StoreResult, map_sqlx_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC-formatted password hash; never the password itself.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Integrity` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<UserRecord>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;
}

#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<UserRecord> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        tracing::info!(user_id = result.last_insert_rowid(), %username, "user registered");
        Ok(UserRecord {
            id: UserId::new(result.last_insert_rowid()),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user", e))?;
        Ok(row.map(UserRecord::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::StoreError;

    #[tokio::test]
    async fn create_then_find() {
        let users = SqliteUserStore::new(db::open("sqlite::memory:").await.unwrap());
        let created = users
            .create_user("alice", "alice@example.com", "$argon2id$stub")
            .await
            .unwrap();

        let found = users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "alice@example.com");
        assert!(users.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let users = SqliteUserStore::new(db::open("sqlite::memory:").await.unwrap());
        users.create_user("alice", "", "h").await.unwrap();
        let err = users.create_user("alice", "", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }
}
