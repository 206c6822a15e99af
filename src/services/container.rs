//! Service container - builds every service from shared infrastructure.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, Catalog, OrderService, OrderWorkflow, PaymentBridge,
    PaymentService, ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{CacheStore, NotificationQueue, PaymentGateway, Persistence, UnitOfWork};

/// All application services, wired to one Unit of Work
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    order_service: Arc<dyn OrderService>,
    payment_service: Arc<dyn PaymentService>,
    product_service: Arc<dyn ProductService>,
}

impl Services {
    /// Wire services over explicit infrastructure
    pub fn new(
        config: &Config,
        uow: Arc<dyn UnitOfWork>,
        gateway: Arc<dyn PaymentGateway>,
        queue: Arc<dyn NotificationQueue>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            user_service: Arc::new(UserManager::new(uow.clone())),
            order_service: Arc::new(OrderWorkflow::new(
                uow.clone(),
                queue,
                config.store_url.clone(),
            )),
            payment_service: Arc::new(PaymentBridge::new(
                uow.clone(),
                gateway,
                config.payment.clone(),
            )),
            product_service: Arc::new(Catalog::new(uow, cache)),
        }
    }

    /// Wire services over a SeaORM connection
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        gateway: Arc<dyn PaymentGateway>,
        queue: Arc<dyn NotificationQueue>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self::new(config, Arc::new(Persistence::new(db)), gateway, queue, cache)
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    pub fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    pub fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    pub fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }
}
