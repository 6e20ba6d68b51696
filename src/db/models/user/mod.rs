use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

pub mod manager;

/// Trait for reading users.
#[async_trait]
pub trait Manager {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Find one page of users, ordered by id.
    async fn find_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<User>>;
    /// Count all users.
    async fn count(&self) -> anyhow::Result<i64>;
}

/// Trait for managing transactions on users.
#[async_trait]
pub trait TxManager {
    /// Create a new user with an already hashed password.
    async fn create(&mut self, username: &str, password_hash: &str) -> anyhow::Result<i64>;
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Model for a user account.
///
/// Accounts are created out of band (see the `createuser` command); the API only reads them.
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2 hash of the password in PHC string format.
    #[serde(skip_serializing)]
    pub password: String,
    /// RFC 3339 timestamp of account creation.
    pub date_joined: String,
}

impl FromRow<'_, AnyRow> for User {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            date_joined: row.try_get("date_joined")?,
        })
    }
}
