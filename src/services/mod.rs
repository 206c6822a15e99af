//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure. Each is a trait
//! with one implementation that reaches repositories through the Unit of
//! Work, so handlers and tests depend only on the trait.

mod auth_service;
pub mod container;
mod order_service;
mod payment_service;
mod product_service;
mod user_service;

pub use container::Services;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use order_service::{NotificationOutcome, OrderService, OrderWorkflow, StatusUpdate};
pub use payment_service::{
    items_total, parse_amount, to_minor_units, CheckoutRequest, CheckoutResponse, PaymentBridge,
    PaymentService, PaymentVerification,
};
pub use product_service::{Catalog, ProductService, ReviewInput};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use order_service::MockOrderService;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_service::MockPaymentService;
#[cfg(any(test, feature = "test-utils"))]
pub use product_service::MockProductService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
