use crate::db::{DatabaseConnection, DatabaseKind, Db as _};

/// Connects to a database and applies migrations.
/// We use `SQLite`; the URL comes from the resolved configuration, which in turn
/// honours the `DATABASE_URL` environment variable.
///
/// # Errors
/// Errors if connection to database fails.
/// Connections can fail if the database file cannot be opened, or if the database URL is invalid.
pub async fn connect(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let connection = DatabaseConnection::connect(db_url).await?;
    tracing::info!("Connected to database");
    migrate(&connection).await?;
    Ok(connection)
}

/// Apply any pending migrations.
///
/// # Errors
/// Errors if a migration fails to apply.
pub async fn migrate(connection: &DatabaseConnection) -> anyhow::Result<()> {
    match connection.kind {
        DatabaseKind::Sqlite => {
            sqlx::migrate!("./migrations/sqlite")
                .run(&connection.pool)
                .await?;
        }
    }
    tracing::debug!("Migrations applied");
    Ok(())
}
