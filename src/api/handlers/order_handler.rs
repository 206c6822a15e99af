//! Customer order handlers.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Router,
};

use crate::api::AppState;
use crate::domain::{CurrentUser, Order};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Customer order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/order/user-orders", get(user_orders))
        .route("/order/:id", get(get_order))
}

/// Orders placed by the current user
#[utoipa::path(
    get,
    path = "/api/order/user-orders",
    tag = "Orders",
    responses(
        (status = 200, description = "The caller's orders", body = [Order]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn user_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state.order_service.list_user_orders(&current_user).await?;
    Ok(ApiResponse::success(orders))
}

/// Single order (owner or admin)
#[utoipa::path(
    get,
    path = "/api/order/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 400, description = "Malformed order id"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.order_service.get_order(&current_user, &id).await?;
    Ok(ApiResponse::success(order))
}
