//! Manager for the user model.
use super::User;
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find a user by primary key.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let statement = "
            SELECT *
            FROM auth_user
            WHERE id = $1
        ";
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, User>(statement)
                    .bind(id)
                    .fetch_optional(&mut *connection)
                    .await?
            }
        };
        Ok(row)
    }

    /// Find a user by username.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let statement = "
            SELECT *
            FROM auth_user
            WHERE username = $1
        ";
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, User>(statement)
                    .bind(username)
                    .fetch_optional(&mut *connection)
                    .await?
            }
        };
        Ok(row)
    }

    /// Find one page of users, ordered by id.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let statement = "
            SELECT *
            FROM auth_user
            ORDER BY id
            LIMIT $1 OFFSET $2
        ";
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, User>(statement)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Count all users.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn count(&self) -> anyhow::Result<i64> {
        let statement = "
            SELECT COUNT(*)
            FROM auth_user
        ";
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, (i64,)>(statement)
                    .fetch_one(&mut *connection)
                    .await?
            }
        };
        Ok(row.0)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new user.
    ///
    /// # Errors
    /// Errors if the username is taken or the user cannot be inserted.
    async fn create(&mut self, username: &str, password_hash: &str) -> anyhow::Result<i64> {
        let statement = "
            INSERT INTO auth_user ( username, password, date_joined )
            VALUES ( $1, $2, $3 )
            RETURNING id
        ";
        let date_joined = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let row = sqlx::query_as::<_, (i64,)>(statement)
            .bind(username)
            .bind(password_hash)
            .bind(date_joined)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.0)
    }
}
