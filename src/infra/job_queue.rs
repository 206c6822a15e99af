//! Notification job queue backed by apalis' PostgreSQL storage.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};
use async_trait::async_trait;

use crate::config::{Config, JOB_QUEUE_MAX_CONNECTIONS};
use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Queue for outgoing notification emails.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Whether queued mail has a transport to go out on.
    fn is_ready(&self) -> bool;

    /// Persist a job for the worker. Returns the job id.
    async fn enqueue(&self, job: EmailJob) -> AppResult<String>;
}

/// Open the job pool and make sure the apalis tables exist.
pub async fn connect_job_pool(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(JOB_QUEUE_MAX_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job queue: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(pool)
}

/// apalis-backed email queue
#[derive(Clone)]
pub struct EmailQueue {
    storage: PostgresStorage<EmailJob>,
    transport_ready: bool,
}

impl EmailQueue {
    pub fn new(pool: PgPool, transport_ready: bool) -> Self {
        Self {
            storage: PostgresStorage::new(pool),
            transport_ready,
        }
    }

    pub fn storage(&self) -> PostgresStorage<EmailJob> {
        self.storage.clone()
    }
}

#[async_trait]
impl NotificationQueue for EmailQueue {
    fn is_ready(&self) -> bool {
        self.transport_ready
    }

    async fn enqueue(&self, job: EmailJob) -> AppResult<String> {
        let mut storage = self.storage.clone();
        let parts = storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;
        Ok(parts.task_id.to_string())
    }
}
