//! Domain layer - Core business entities and logic
//!
//! Entities and value objects, independent of persistence and transport.

pub mod order;
pub mod password;
pub mod product;
pub mod user;

pub use order::{
    DeliveryStatus, LineItem, NewOrder, Order, PaymentInfo, PaymentStatus, ShippingInfo,
};
pub use password::Password;
pub use product::{NewProduct, NewReview, Product, ProductChanges, Review};
pub use user::{CurrentUser, User, UserResponse, UserRole};
