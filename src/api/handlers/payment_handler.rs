//! Checkout and payment verification handlers.

use axum::{extract::State, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::CurrentUser;
use crate::errors::AppResult;
use crate::services::{CheckoutRequest, CheckoutResponse, PaymentVerification};
use crate::types::ApiResponse;

/// Payment verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPaymentRequest {
    #[schema(example = "T123456789")]
    pub reference: Option<String>,
}

/// Checkout routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payment/checkout", post(checkout))
        .route("/payment/verifyPayment", post(verify_payment))
}

/// Start a gateway checkout
#[utoipa::path(
    post,
    path = "/api/payment/checkout",
    tag = "Payments",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout initialized", body = CheckoutResponse),
        (status = 400, description = "Invalid amount or email"),
        (status = 500, description = "Gateway error, message relayed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CheckoutRequest>,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let checkout = state
        .payment_service
        .initialize(&current_user, payload)
        .await?;
    Ok(ApiResponse::with_message(checkout, "Checkout initialized"))
}

/// Verify a gateway transaction
#[utoipa::path(
    post,
    path = "/api/payment/verifyPayment",
    tag = "Payments",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Verification result", body = PaymentVerification),
        (status = 400, description = "Missing reference"),
        (status = 500, description = "Gateway error, message relayed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> AppResult<ApiResponse<PaymentVerification>> {
    let verification = state.payment_service.verify(payload.reference).await?;
    let message = if verification.success {
        "Payment verified"
    } else {
        "Payment not successful"
    };
    Ok(ApiResponse::with_message(verification, message))
}
