//! Email background job.
//!
//! Jobs are written to the apalis queue by the order workflow and picked up
//! by `jobs work`. Delivery goes through whichever [`Mailer`] the worker was
//! started with; failed attempts are retried by the worker's retry layer.

use std::sync::Arc;

use apalis::prelude::Data;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::infra::Mailer;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    #[serde(default)]
    pub body_html: Option<String>,
}

impl EmailJob {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body_text: body_text.into(),
            body_html: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }
}

/// Email job handler
pub async fn email_job_handler(
    job: EmailJob,
    mailer: Data<Arc<dyn Mailer>>,
) -> Result<(), AppError> {
    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    match mailer.send(&job).await {
        Ok(()) => {
            tracing::info!(to = %job.to, "Email sent");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(to = %job.to, error = %e, "Email delivery failed");
            Err(e)
        }
    }
}
