//! This module contains the API endpoints for the server.
pub mod auth;
pub mod format;
pub mod pagination;
pub mod permissions;
pub mod request;
pub mod root;
pub mod routes;
pub mod snippets;
pub mod state;
pub mod users;
