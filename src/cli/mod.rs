//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Email job queue management
//! - `users` - Account administration

pub mod args;

pub use args::{Cli, Commands};
