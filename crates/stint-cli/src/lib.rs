//! Work-time ledger CLI library.
//!
//! This crate provides the command-line interface for the stint
//! ledger.

pub mod app;
mod cli;
mod config;
pub mod prompt;
pub mod render;

pub use cli::Cli;
pub use config::Config;
