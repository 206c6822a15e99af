//! Authentication handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CurrentUser, UserResponse};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::{ApiResponse, Created};

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// Credential verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCredentialsRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Public credential routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify", post(verify_credentials))
}

/// Routes that need a valid session token
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/session", get(session))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .register(payload.email, payload.password, payload.name)
        .await?;

    Ok(Created(UserResponse::from(user), "Account created"))
}

/// Verify credentials and issue a session token
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "Authentication",
    request_body = VerifyCredentialsRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn verify_credentials(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyCredentialsRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .auth_service
        .verify_credentials(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(token))
}

/// Current session principal
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session principal", body = CurrentUser),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn session(Extension(current_user): Extension<CurrentUser>) -> ApiResponse<CurrentUser> {
    ApiResponse::success(current_user)
}
