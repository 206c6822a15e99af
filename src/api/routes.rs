//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, catalog_routes, order_routes, payment_routes, session_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(&state))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    // Credential endpoints (stricter rate limiting)
    let credentials = auth_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_auth_middleware,
    ));

    // Everything behind a session token
    let protected = Router::new()
        .merge(session_routes())
        .merge(order_routes())
        .merge(payment_routes())
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let general = Router::new()
        .merge(catalog_routes(state))
        .merge(protected)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new().merge(credentials).merge(general)
}

/// Root endpoint
async fn root() -> &'static str {
    "Storefront API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: Vec<ServiceStatus>,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    name: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint covering every registered dependency
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut services = Vec::with_capacity(state.health_checks.len());
    for probe in &state.health_checks {
        let status = match probe.check().await {
            Ok(()) => ServiceStatus {
                name: probe.name(),
                status: "healthy",
                error: None,
            },
            Err(e) => {
                tracing::warn!(service = probe.name(), error = %e, "Health check failed");
                ServiceStatus {
                    name: probe.name(),
                    status: "unhealthy",
                    error: Some(e.to_string()),
                }
            }
        };
        services.push(status);
    }

    let all_healthy = services.iter().all(|s| s.error.is_none());

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services,
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
