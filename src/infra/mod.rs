//! Infrastructure layer - External systems integration
//!
//! Database and repositories, Redis, the payment gateway client,
//! SMTP transports and the email job queue.

pub mod cache;
pub mod db;
pub mod health;
pub mod job_queue;
pub mod mailer;
pub mod payment_gateway;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{get_json, set_json, Cache, CacheStore, RateLimiter};
pub use db::{Database, Migrator};
pub use health::HealthCheck;
pub use job_queue::{connect_job_pool, EmailQueue, NotificationQueue};
pub use mailer::{mailer_from_config, LogMailer, Mailer, SmtpMailer};
pub use payment_gateway::{
    InitializeTransaction, PaymentGateway, PaystackClient, TransactionAuthorization,
    TransactionVerification,
};
pub use repositories::{
    NewUser, OrderRepository, ProductRepository, ReviewRepository, UserRepository,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::{MockCacheStore, MockRateLimiter};
#[cfg(any(test, feature = "test-utils"))]
pub use job_queue::MockNotificationQueue;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_gateway::MockPaymentGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockOrderRepository, MockProductRepository, MockReviewRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
