//! Unit of Work: a single hub handing out one repository per collection.
//!
//! Services depend on `Arc<dyn UnitOfWork>` rather than on individual
//! stores, so wiring stays in one place and tests can swap in
//! `MockUnitOfWork`.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    OrderRepository, OrderStore, ProductRepository, ProductStore, ReviewRepository, ReviewStore,
    UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;
}

/// SeaORM implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    order_repo: Arc<OrderStore>,
    product_repo: Arc<ProductStore>,
    review_repo: Arc<ReviewStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            review_repo: Arc::new(ReviewStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.review_repo.clone()
    }
}
