//! Public catalog handlers.

use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::domain::{CurrentUser, Product, Review};
use crate::errors::AppResult;
use crate::services::ReviewInput;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Catalog listing filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryFilter {
    /// Only products in this category
    pub category: Option<String>,
}

/// Catalog routes. Browsing is public; posting a review needs a session.
pub fn catalog_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:slug", get(get_product))
        .route(
            "/products/:slug/reviews",
            get(list_reviews).merge(post(add_review).route_layer(
                middleware::from_fn_with_state(state.clone(), auth_middleware),
            )),
        )
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(PaginationParams, CategoryFilter),
    responses((status = 200, description = "Paginated products"))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<ApiResponse<Paginated<Product>>> {
    let products = state
        .product_service
        .list_products(&params, filter.category)
        .await?;
    Ok(ApiResponse::success(products))
}

/// Product detail by slug
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Product>> {
    let product = state.product_service.get_product(&slug).await?;
    Ok(ApiResponse::success(product))
}

/// Reviews for a product
#[utoipa::path(
    get,
    path = "/api/products/{slug}/reviews",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [Review]),
        (status = 404, description = "Product not found")
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Vec<Review>>> {
    let reviews = state.product_service.list_reviews(&slug).await?;
    Ok(ApiResponse::success(reviews))
}

/// Review a product
#[utoipa::path(
    post,
    path = "/api/products/{slug}/reviews",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = ReviewInput,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Rating outside 1-5 or empty comment"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(slug): Path<String>,
    ValidatedJson(input): ValidatedJson<ReviewInput>,
) -> AppResult<Created<Review>> {
    let review = state
        .product_service
        .add_review(&current_user, &slug, input)
        .await?;
    Ok(Created(review, "Review added"))
}
