//! Storefront API - catalog, checkout and order administration backend
//!
//! Customers browse products, check out through a hosted payment gateway and
//! track their orders. Admins move orders through the delivery workflow,
//! which emails customers through a persistent job queue.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, orders, products and reviews
//! - **services**: Use cases (auth, orders, payments, catalog, users)
//! - **infra**: Database, Redis, payment gateway, SMTP and the job queue
//! - **jobs**: Background job payloads and handlers
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **utils**: Email templates
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Send queued notification emails
//! cargo run -- jobs work
//!
//! # Promote the first admin
//! cargo run -- users set-role owner@example.com admin
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{CurrentUser, DeliveryStatus, Order, Password, User, UserRole};
pub use errors::{AppError, AppResult};
