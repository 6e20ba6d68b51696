//! The snippets HTTP server.

pub mod api;
pub mod app;
pub mod errors;
pub mod headers;
pub mod tracing;
