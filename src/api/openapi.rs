//! OpenAPI documentation configuration.
//!
//! Served at `/api-docs/openapi.json` with Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, order_handler, payment_handler, product_handler,
};
use crate::domain::{
    CurrentUser, DeliveryStatus, LineItem, NewProduct, Order, PaymentInfo, PaymentStatus,
    Product, ProductChanges, Review, ShippingInfo, UserResponse, UserRole,
};
use crate::services::{
    CheckoutRequest, CheckoutResponse, NotificationOutcome, PaymentVerification, ReviewInput,
    StatusUpdate, TokenResponse,
};

/// OpenAPI documentation for the storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Catalog, checkout, order tracking and the admin console",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::verify_credentials,
        auth_handler::session,
        // Catalog
        product_handler::list_products,
        product_handler::get_product,
        product_handler::list_reviews,
        product_handler::add_review,
        // Orders
        order_handler::user_orders,
        order_handler::get_order,
        // Payments
        payment_handler::checkout,
        payment_handler::verify_payment,
        // Admin
        admin_handler::list_orders,
        admin_handler::get_order,
        admin_handler::update_order_status,
        admin_handler::list_users,
        admin_handler::update_user_role,
        admin_handler::delete_user,
        admin_handler::create_product,
        admin_handler::update_product,
        admin_handler::delete_product,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            CurrentUser,
            DeliveryStatus,
            PaymentStatus,
            LineItem,
            ShippingInfo,
            PaymentInfo,
            Order,
            Product,
            NewProduct,
            ProductChanges,
            Review,
            // Service types
            TokenResponse,
            ReviewInput,
            CheckoutRequest,
            CheckoutResponse,
            PaymentVerification,
            NotificationOutcome,
            StatusUpdate,
            // Request bodies
            auth_handler::RegisterRequest,
            auth_handler::VerifyCredentialsRequest,
            payment_handler::VerifyPaymentRequest,
            admin_handler::UpdateStatusRequest,
            admin_handler::UpdateRoleRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, credential checks and sessions"),
        (name = "Catalog", description = "Products and reviews"),
        (name = "Orders", description = "Customer order history"),
        (name = "Payments", description = "Gateway checkout and verification"),
        (name = "Admin", description = "Order, user and catalog management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token obtained from /api/auth/verify"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_admin_status_route() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/admin/orders/{id}/status"));
        assert!(doc.paths.paths.contains_key("/api/payment/verifyPayment"));
    }
}
