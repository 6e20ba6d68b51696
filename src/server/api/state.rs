//! Centralized state management for the Actix web server
use crate::db;

/// Number of records per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Global, read-only state
pub trait Global {
    /// Database connection
    fn db(&self) -> &db::DatabaseConnection;
    /// Number of records per page on list endpoints
    fn page_size(&self) -> u32;
}

/// Application state
#[derive(Debug, Clone)]
pub struct App {
    /// Database connection
    pub db: db::DatabaseConnection,
    /// Number of records per page on list endpoints
    pub page_size: u32,
}

impl App {
    /// State with the default page size.
    #[must_use]
    pub fn new(db: db::DatabaseConnection) -> Self {
        Self {
            db,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Global for App {
    fn db(&self) -> &db::DatabaseConnection {
        &self.db
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
