//! The utils module contains utility functions and structs.
pub mod cli;
pub mod config;
