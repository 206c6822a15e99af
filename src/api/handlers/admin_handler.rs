//! Admin console handlers: orders, users and catalog management.
//!
//! Order and user routes are admin only; product routes also admit editors.
//! The delivery-status route leaves the role check to the order workflow,
//! which authorizes before looking at the input.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_catalog_manager};
use crate::api::AppState;
use crate::domain::{CurrentUser, NewProduct, Order, Product, ProductChanges, UserResponse};
use crate::errors::AppResult;
use crate::services::StatusUpdate;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Admin order listing filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderFilter {
    /// Only orders with this delivery status
    pub status: Option<String>,
}

/// Delivery status change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    #[schema(example = "shipped")]
    pub status: String,
}

/// Role change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[schema(example = "editor")]
    pub role: String,
}

/// Admin console routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/:id", get(get_order))
        .route("/admin/orders/:id/status", patch(update_order_status))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/users/:id/role", patch(update_user_role))
        .route("/admin/products", post(create_product))
        .route(
            "/admin/products/:id",
            patch(update_product).delete(delete_product),
        )
}

/// List all orders
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    params(PaginationParams, OrderFilter),
    responses(
        (status = 200, description = "Paginated orders"),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<ApiResponse<Paginated<Order>>> {
    require_admin(&current_user)?;
    let orders = state.order_service.list_orders(&params, filter.status).await?;
    Ok(ApiResponse::success(orders))
}

/// Get any order
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    operation_id = "admin_get_order",
    tag = "Admin",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    require_admin(&current_user)?;
    let order = state.order_service.get_order(&current_user, &id).await?;
    Ok(ApiResponse::success(order))
}

/// Change an order's delivery status and notify the customer
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    tag = "Admin",
    params(("id" = String, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status saved; notification outcome reported separately", body = StatusUpdate),
        (status = 400, description = "Malformed id or unknown status"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found or incomplete"),
        (status = 500, description = "Email transport not configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<StatusUpdate>> {
    let update = state
        .order_service
        .update_delivery_status(&current_user, &id, &payload.status)
        .await?;
    Ok(ApiResponse::with_message(update, "Order status updated"))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.user_service.list_users(&params).await?;
    Ok(ApiResponse::success(users.map(UserResponse::from)))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role or own account"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state
        .user_service
        .set_role(&current_user, id, &payload.role)
        .await?;
    Ok(ApiResponse::with_message(UserResponse::from(user), "Role updated"))
}

/// Delete a user (their orders are kept)
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;
    state.user_service.delete_user(&current_user, id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Admin",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin or editor only"),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<NewProduct>,
) -> AppResult<Created<Product>> {
    require_catalog_manager(&current_user)?;
    let product = state.product_service.create_product(payload).await?;
    Ok(Created(product, "Product created"))
}

/// Update a product
#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 403, description = "Admin or editor only"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductChanges>,
) -> AppResult<ApiResponse<Product>> {
    require_catalog_manager(&current_user)?;
    let product = state.product_service.update_product(id, payload).await?;
    Ok(ApiResponse::with_message(product, "Product updated"))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 403, description = "Admin or editor only"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_catalog_manager(&current_user)?;
    state.product_service.delete_product(id).await?;
    Ok(ApiResponse::message("Product deleted"))
}
