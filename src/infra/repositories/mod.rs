//! Repository layer - Data access abstraction
//!
//! One repository per collection. Each trait has a SeaORM implementation
//! and, under `test-utils`, a mockall mock.

pub(crate) mod entities;
mod order_repository;
mod product_repository;
mod user_repository;

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

pub use order_repository::{OrderRepository, OrderStore};
pub use product_repository::{ProductRepository, ProductStore, ReviewRepository, ReviewStore};
pub use user_repository::{NewUser, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::{MockProductRepository, MockReviewRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Unique violations become conflicts, everything else a database error
pub(crate) fn map_write_error(err: DbErr, entity: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(err),
    }
}
