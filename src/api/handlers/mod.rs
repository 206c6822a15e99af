//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod order_handler;
pub mod payment_handler;
pub mod product_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::{auth_routes, session_routes};
pub use order_handler::order_routes;
pub use payment_handler::payment_routes;
pub use product_handler::catalog_routes;
