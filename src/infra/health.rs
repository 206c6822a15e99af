//! Readiness probes for backing services.

use async_trait::async_trait;

use crate::errors::AppResult;

/// A dependency the `/health` endpoint reports on.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Name shown in the health report
    fn name(&self) -> &'static str;

    async fn check(&self) -> AppResult<()>;
}
