//! Server configuration, read from an optional TOML file.
use serde_derive::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

use crate::server::api::state::DEFAULT_PAGE_SIZE;

/// Environment variable that overrides the configured database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Database used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./snippets.sqlite3?mode=rwc";

/// The whole configuration file. Every section and key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// `[server]` section.
    pub server: Server,
    /// `[database]` section.
    pub database: Database,
    /// `[api]` section.
    pub api: Api,
}

/// Where the HTTP server listens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Server {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Database settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Database {
    /// `sqlx` connection URL.
    pub url: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
        }
    }
}

/// API behaviour.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Api {
    /// Records per page on list endpoints.
    pub page_size: u32,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Parse a configuration file.
    ///
    /// # Errors
    /// Errors if the file cannot be read, is not valid TOML, or sets a zero page size.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config_str = read_to_string(path)?;
        let conf: Self = toml::from_str(&config_str)?;
        if conf.api.page_size == 0 {
            anyhow::bail!("`api.page_size` must be at least 1");
        }
        Ok(conf)
    }

    /// Load the configuration: the file at `path` if given, defaults otherwise,
    /// then the `DATABASE_URL` environment variable on top.
    ///
    /// # Errors
    /// Errors if a given file cannot be parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut conf = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        conf.override_database_url(std::env::var(DATABASE_URL_ENV).ok());
        Ok(conf)
    }

    /// Replace the database URL when `url` is set and non-empty.
    pub fn override_database_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.database.url = url;
        }
    }
}
