//! Jobs command - Email job queue management.
//!
//! Provides CLI commands to manage the notification queue:
//! - `work`: Start the email worker process
//! - `list`: Show job counts by status
//! - `clear`: Remove failed jobs from the queue
//! - `retry`: Put failed jobs back in the queue
//!
//! ## Usage
//!
//! ```bash
//! # Start the email worker
//! cargo run -- jobs work
//!
//! # List job queue status
//! cargo run -- jobs list
//!
//! # Re-queue jobs that ran out of attempts
//! cargo run -- jobs retry
//! ```

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Statuses apalis leaves on jobs that will not run again by themselves
const FAILED_STATUSES: &str = "('Failed', 'Killed')";

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
        JobsAction::Retry => retry_failed_jobs(&config).await,
    }
}

/// Start the email worker
///
/// Pulls jobs from the PostgreSQL queue and sends them through the configured
/// mailer. Failed sends are retried a bounded number of times.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::layers::retry::RetryPolicy;
    use apalis::prelude::*;

    use crate::config::{EMAIL_JOB_MAX_RETRIES, JOB_NAME_EMAIL};
    use crate::infra::{connect_job_pool, mailer_from_config, EmailQueue};
    use crate::jobs::email_job_handler;

    let mailer = mailer_from_config(&config.email)?;

    tracing::info!("Connecting to database for job worker...");
    let pool = connect_job_pool(config).await?;
    let queue = EmailQueue::new(pool, true);

    tracing::info!(
        max_retries = EMAIL_JOB_MAX_RETRIES,
        "Email worker started. Press Ctrl+C to stop."
    );

    let worker = WorkerBuilder::new(JOB_NAME_EMAIL)
        .data(mailer)
        .retry(RetryPolicy::retries(EMAIL_JOB_MAX_RETRIES))
        .backend(queue.storage())
        .build_fn(email_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker error");
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped.");
    Ok(())
}

/// Show job counts by status
async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = open_queue(config).await? else {
        println!("Job queue not initialized. Run 'jobs work' or 'serve' first.");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status".to_string(),
        ))
        .await?;

    let mut pending = 0i64;
    let mut running = 0i64;
    let mut failed = 0i64;
    let mut done = 0i64;

    for row in rows {
        let status = row.try_get::<String>("", "status")?;
        let count = row.try_get::<i64>("", "count")?;
        match status.as_str() {
            "Pending" => pending += count,
            "Running" => running += count,
            "Failed" | "Killed" => failed += count,
            "Done" => done += count,
            other => tracing::debug!(status = other, count, "Unrecognized job status"),
        }
    }

    println!("\n=== Email Queue Status ===");
    println!("Pending:  {}", pending);
    println!("Running:  {}", running);
    println!("Failed:   {}", failed);
    println!("Done:     {}", done);
    println!("==========================\n");

    Ok(())
}

/// Delete failed jobs
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = open_queue(config).await? else {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            format!("DELETE FROM apalis.jobs WHERE status IN {}", FAILED_STATUSES),
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}

/// Reset failed jobs so the worker picks them up again
async fn retry_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = open_queue(config).await? else {
        println!("Job queue not initialized. Nothing to retry.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            format!(
                "UPDATE apalis.jobs SET status = 'Pending', attempts = 0, done_at = NULL, \
                 lock_by = NULL, lock_at = NULL, last_error = NULL, run_at = NOW() \
                 WHERE status IN {}",
                FAILED_STATUSES
            ),
        ))
        .await?;

    let count = result.rows_affected();
    tracing::info!(count, "Failed jobs re-queued");
    println!("Re-queued {} failed job(s).", count);
    Ok(())
}

/// Connect and check that the apalis schema exists.
async fn open_queue(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    tracing::info!("Connecting to database...");
    let db = sea_orm::Database::connect(&config.database_url).await?;

    let exists = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists".to_string(),
        ))
        .await?
        .map(|row| row.try_get::<bool>("", "exists"))
        .transpose()?
        .unwrap_or(false);

    Ok(exists.then_some(db))
}
