//! Running the CLI

// Allow exits because in this file we ideally handle all errors with known exit codes
#![allow(clippy::exit)]

use crate::db::{self, models::user, Tx as _};
use crate::server::api::auth::hash_password;
use crate::server::app::serve;
use crate::utils::config::Config;
use clap::Parser;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing;
use tracing_subscriber::EnvFilter;

/// Longest accepted username.
const USERNAME_MAX_LENGTH: usize = 150;

/// Snippets is a small API for sharing syntax-highlighted code snippets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Database URL. Overrides `DATABASE_URL` and the configuration file.
    #[arg(long)]
    database_url: Option<String>,
    /// Snippets cli subcommands
    #[command(subcommand)]
    subcommands: Subcommands,
}

///
#[derive(Clone, clap::Subcommand)]
enum Subcommands {
    /// Apply migrations and serve the API
    Serve {
        /// Address to bind to.
        #[arg(short, long)]
        bind: Option<String>,
        /// Port on which to serve the API.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create a user account
    Createuser {
        /// Login name.
        username: String,
        /// Password, stored as an argon2 hash.
        #[arg(long)]
        password: String,
    },
    /// Apply pending migrations and exit
    Migrate,
}

/// Log to stdout, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Check a username against the characters and length accounts may use.
///
/// # Errors
/// Errors if the username is empty, too long, or contains other characters.
pub fn validate_username(username: &str) -> anyhow::Result<()> {
    lazy_static! {
        static ref USERNAME: Regex =
            Regex::new(r"^[\w.@+-]+$").expect("Failed to compile regex!?!");
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        anyhow::bail!("Username must be at most {USERNAME_MAX_LENGTH} characters");
    }
    if !USERNAME.is_match(username) {
        anyhow::bail!("Username may contain only letters, digits and @/./+/-/_");
    }
    Ok(())
}

/// Create a user account with a hashed password.
///
/// # Errors
/// Errors if the username is invalid or taken, or the database is unreachable.
#[actix_web::main]
pub async fn create_user(db_url: &str, username: &str, password: &str) -> anyhow::Result<i64> {
    validate_username(username)?;
    if password.is_empty() {
        anyhow::bail!("Password may not be empty");
    }
    let connection = db::init::connect(db_url).await?;
    if user::Manager::find_by_username(&connection, username).await?.is_some() {
        anyhow::bail!("A user named '{username}' already exists");
    }
    let hash = hash_password(password)?;
    let mut tx = connection.begin().await?;
    let id = user::TxManager::create(&mut tx, username, &hash).await?;
    tx.commit().await?;
    Ok(id)
}

/// Apply pending migrations.
///
/// # Errors
/// Errors if the database is unreachable or a migration fails.
#[actix_web::main]
pub async fn migrate(db_url: &str) -> anyhow::Result<()> {
    db::init::connect(db_url).await?;
    Ok(())
}

/// Main entrypoint to application
///
/// # Errors
/// Errors if the server fails to bind or stops with an I/O error.
pub fn run() -> std::io::Result<()> {
    init_tracing();
    tracing::debug!("Starting application");
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|err| {
        tracing::error!("error: could not load configuration: {err:?}");
        std::process::exit(1);
    });
    config.override_database_url(cli.database_url);

    match cli.subcommands {
        Subcommands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config)
        }
        Subcommands::Createuser { username, password } => {
            match create_user(&config.database.url, &username, &password) {
                Ok(id) => {
                    tracing::info!("Created user '{username}' with id {id}");
                    Ok(())
                }
                Err(err) => {
                    tracing::error!("error: could not create user: {err:?}");
                    std::process::exit(1);
                }
            }
        }
        Subcommands::Migrate => {
            if let Err(err) = migrate(&config.database.url) {
                tracing::error!("error: could not migrate database: {err:?}");
                std::process::exit(1);
            }
            tracing::info!("Migrations applied");
            Ok(())
        }
    }
}
