//! Database related module.
//!
//! Snippets are stored in `SQLite` through sqlx's `Any` driver. Reads go through
//! the pool directly; every write runs inside a [`DatabaseTransaction`].
use async_trait::async_trait;
use sqlx::Transaction;
use std::str::FromStr;

use sqlx::any::{self, AnyConnectOptions, AnyPoolOptions};
use sqlx::AnyPool;
use sqlx::ConnectOptions;
use tracing::instrument;

/// Database initialization.
pub mod init;
/// Models for the database.
pub mod models;

/// Maximum number of pooled connections for file-backed databases.
const MAX_CONNECTIONS: u32 = 50;

#[async_trait]
/// Generic Database
pub trait Db {
    /// Connects to a database.
    ///
    /// # Errors
    /// Errors if connection to database fails.
    async fn connect(url: &str) -> anyhow::Result<DatabaseConnection>;
}

#[async_trait]
/// Ends a transaction.
pub trait Tx {
    /// Make the transaction's writes visible.
    async fn commit(self) -> anyhow::Result<()>;
    /// Discard the transaction's writes.
    async fn rollback(self) -> anyhow::Result<()>;
}

/// Type of database connection.
#[derive(Debug, Clone)]
pub enum DatabaseKind {
    /// Sqlite database.
    Sqlite,
}

/// Database connection.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    /// Database connection pool.
    pub pool: AnyPool,
    /// Type of database connection.
    pub kind: DatabaseKind,
}

/// Database transaction.
pub struct DatabaseTransaction {
    /// Database transaction.
    pub tx: Transaction<'static, sqlx::Any>,
}

/// Whether `db_url` points to a private, in-memory `SQLite` database.
///
/// Every connection to such a URL opens a fresh, empty database, so the pool
/// must hold on to exactly one connection for the lifetime of the process.
fn is_in_memory(db_url: &str) -> bool {
    db_url.starts_with("sqlite::memory:") || db_url.contains("mode=memory")
}

/// Pool settings for `db_url`.
fn pool_options(db_url: &str) -> AnyPoolOptions {
    if is_in_memory(db_url) {
        return AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    AnyPoolOptions::new().max_connections(MAX_CONNECTIONS)
}

#[async_trait]
impl Db for DatabaseConnection {
    /// Connects to a database.
    ///
    /// # Errors
    /// Errors if connection to database fails, or if the URL names an unsupported backend.
    #[instrument(level = "trace")]
    async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let kind = match db_url {
            url if url.starts_with("sqlite:") => DatabaseKind::Sqlite,
            _ => anyhow::bail!("Unsupported database URL: {}", db_url),
        };
        any::install_default_drivers();
        let options = AnyConnectOptions::from_str(db_url)?.disable_statement_logging();
        let pool = pool_options(db_url).connect_with(options).await?;
        Ok(Self { pool, kind })
    }
}

impl DatabaseConnection {
    /// Begin a transaction.
    ///
    /// On an in-memory database this takes the only connection, so no read may
    /// go through the pool until the transaction ends.
    ///
    /// # Errors
    /// Errors if no connection could be acquired from the pool.
    pub async fn begin(&self) -> anyhow::Result<DatabaseTransaction> {
        let tx = self.pool.begin().await?;
        tracing::trace!("Transaction started");
        Ok(DatabaseTransaction { tx })
    }
}

#[async_trait]
impl Tx for DatabaseTransaction {
    async fn commit(self) -> anyhow::Result<()> {
        self.tx.commit().await?;
        tracing::trace!("Transaction committed");
        Ok(())
    }

    async fn rollback(self) -> anyhow::Result<()> {
        self.tx.rollback().await?;
        tracing::debug!("Transaction rolled back");
        Ok(())
    }
}
