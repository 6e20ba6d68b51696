//! This module contains all the sqlx structs for the database tables.

/// sqlx structs for snippet table.
pub mod snippet;
/// sqlx structs for `auth_user` table.
pub mod user;
