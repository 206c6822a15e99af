//! Application state - Dependency injection container.
//!
//! Holds every service as a trait object plus the rate limiter and health
//! probes. Built once at startup; no module-level globals.

use std::sync::Arc;

use crate::infra::{HealthCheck, RateLimiter};
use crate::services::{
    AuthService, OrderService, PaymentService, ProductService, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub order_service: Arc<dyn OrderService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub product_service: Arc<dyn ProductService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Dependencies reported by `/health`
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl AppState {
    pub fn new(
        services: &Services,
        rate_limiter: Arc<dyn RateLimiter>,
        health_checks: Vec<Arc<dyn HealthCheck>>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            order_service: services.orders(),
            payment_service: services.payments(),
            product_service: services.products(),
            rate_limiter,
            health_checks,
        }
    }
}
