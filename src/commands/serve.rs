//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{connect_job_pool, Cache, Database, EmailQueue, HealthCheck, PaystackClient};
use crate::services::Services;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Database handle lives for the whole process and is closed on shutdown
    let database = Database::connect(&config).await?;

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let job_pool = connect_job_pool(&config).await?;
    let email_ready = config.email.can_deliver();
    if !email_ready {
        tracing::warn!("SMTP not configured - status changes that notify customers will be refused");
    }
    let queue = Arc::new(EmailQueue::new(job_pool, email_ready));

    let gateway = Arc::new(PaystackClient::new(&config.payment));
    if config.payment.secret_key().is_none() {
        tracing::warn!("PAYSTACK_SECRET_KEY not set - checkout will be unavailable");
    }

    let cache = Arc::new(cache);
    let services = Services::from_connection(
        database.get_connection(),
        &config,
        gateway,
        queue,
        cache.clone(),
    );

    let health_checks: Vec<Arc<dyn HealthCheck>> =
        vec![Arc::new(database.clone()), cache.clone()];
    let app_state = AppState::new(&services, cache, health_checks);

    let app = create_router(app_state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped, closing database connection");
    database.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
