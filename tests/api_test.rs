//! Integration tests for API endpoints.
//!
//! The real router runs against mock services, so these tests cover routing,
//! middleware ordering, extractors and the response envelope without a
//! database or Redis.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::api::{create_router, AppState};
use storefront_api::domain::{
    DeliveryStatus, LineItem, Order, PaymentInfo, PaymentStatus, Product, ShippingInfo,
};
use storefront_api::errors::AppError;
use storefront_api::infra::MockRateLimiter;
use storefront_api::services::{
    Claims, MockAuthService, MockOrderService, MockPaymentService, MockProductService,
    MockUserService, NotificationOutcome, StatusUpdate,
};

const ADMIN_ID: Uuid = Uuid::from_u128(1);
const CUSTOMER_ID: Uuid = Uuid::from_u128(2);

// =============================================================================
// Test app
// =============================================================================

struct TestApp {
    auth: MockAuthService,
    users: MockUserService,
    orders: MockOrderService,
    payments: MockPaymentService,
    products: MockProductService,
    limiter: MockRateLimiter,
}

impl TestApp {
    /// Sessions for `admin-token` and `user-token`, rate limiter always allows
    fn new() -> Self {
        let mut auth = MockAuthService::new();
        auth.expect_verify_token().returning(|token| match token {
            "admin-token" => Ok(claims(ADMIN_ID, "admin")),
            "user-token" => Ok(claims(CUSTOMER_ID, "user")),
            _ => Err(AppError::Unauthorized),
        });

        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_check_rate_limit()
            .returning(|_, _, _| Ok((1, true)));

        Self {
            auth,
            users: MockUserService::new(),
            orders: MockOrderService::new(),
            payments: MockPaymentService::new(),
            products: MockProductService::new(),
            limiter,
        }
    }

    fn router(self) -> Router {
        create_router(AppState {
            auth_service: Arc::new(self.auth),
            user_service: Arc::new(self.users),
            order_service: Arc::new(self.orders),
            payment_service: Arc::new(self.payments),
            product_service: Arc::new(self.products),
            rate_limiter: Arc::new(self.limiter),
            health_checks: Vec::new(),
        })
    }
}

fn claims(id: Uuid, role: &str) -> Claims {
    Claims {
        sub: id,
        email: format!("{}@example.com", role),
        role: role.to_string(),
        exp: Utc::now().timestamp() + 3600,
        iat: Utc::now().timestamp(),
    }
}

fn sample_order(id: Uuid, status: DeliveryStatus) -> Order {
    Order {
        id,
        user_id: CUSTOMER_ID,
        items: vec![LineItem {
            product_id: Uuid::new_v4(),
            name: "Linen shirt".to_string(),
            quantity: 1,
            unit_price: 4500.0,
            color: None,
        }],
        total_amount: 4500.0,
        currency: "NGN".to_string(),
        shipping_info: Some(ShippingInfo {
            full_name: "Ada Obi".to_string(),
            phone: "+2348000000000".to_string(),
            email: Some("ada@example.com".to_string()),
            region: "Lagos".to_string(),
            street: "12 Marina Road".to_string(),
            postal_code: None,
            notes: None,
        }),
        payment: PaymentInfo {
            method: "paystack".to_string(),
            status: PaymentStatus::Paid,
            reference: Some("T123".to_string()),
        },
        delivery_status: status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_product(slug: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: "Linen shirt".to_string(),
        description: "Breathable".to_string(),
        price: 4500.0,
        currency: "NGN".to_string(),
        images: vec![],
        colors: vec!["navy".to_string()],
        stock: 3,
        category: Some("shirts".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Infrastructure endpoints
// =============================================================================

#[tokio::test]
async fn test_health_without_probes_is_healthy() {
    let (status, body) = send(
        TestApp::new().router(),
        request(Method::GET, "/health", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(
        TestApp::new().router(),
        request(Method::GET, "/api-docs/openapi.json", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/admin/orders/{id}/status"].is_object());
}

// =============================================================================
// Admin delivery status
// =============================================================================

#[tokio::test]
async fn test_status_update_requires_session() {
    let mut app = TestApp::new();
    app.orders.expect_update_delivery_status().never();

    let (status, body) = send(
        app.router(),
        request(
            Method::PATCH,
            &format!("/api/admin/orders/{}/status", Uuid::new_v4()),
            None,
            Some(json!({ "status": "shipped" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_status_update_reports_notification() {
    let order_id = Uuid::new_v4();
    let mut app = TestApp::new();
    app.orders
        .expect_update_delivery_status()
        .withf(move |actor, id, status| {
            actor.id == ADMIN_ID && id == order_id.to_string() && status == "shipped"
        })
        .times(1)
        .returning(|_, id, _| {
            let id = Uuid::parse_str(id).unwrap();
            Ok(StatusUpdate {
                order: sample_order(id, DeliveryStatus::Shipped),
                notification: NotificationOutcome::Queued {
                    job_id: "42".to_string(),
                    recipient: "ada@example.com".to_string(),
                },
            })
        });

    let (status, body) = send(
        app.router(),
        request(
            Method::PATCH,
            &format!("/api/admin/orders/{}/status", order_id),
            Some("admin-token"),
            Some(json!({ "status": "shipped" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["order"]["delivery_status"], "shipped");
    assert_eq!(body["data"]["notification"]["status"], "queued");
    assert_eq!(body["data"]["notification"]["job_id"], "42");
}

#[tokio::test]
async fn test_customer_status_update_is_forbidden() {
    let mut app = TestApp::new();
    app.orders
        .expect_update_delivery_status()
        .returning(|_, _, _| Err(AppError::Forbidden));

    let (status, body) = send(
        app.router(),
        request(
            Method::PATCH,
            &format!("/api/admin/orders/{}/status", Uuid::new_v4()),
            Some("user-token"),
            Some(json!({ "status": "shipped" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_listing_rejects_customers() {
    let mut app = TestApp::new();
    app.users.expect_list_users().never();
    app.orders.expect_list_orders().never();

    let router = app.router();
    for uri in ["/api/admin/users", "/api/admin/orders"] {
        let (status, _) = send(
            router.clone(),
            request(Method::GET, uri, Some("user-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limited_request_gets_429_envelope() {
    let mut app = TestApp::new();
    app.limiter = MockRateLimiter::new();
    app.limiter
        .expect_check_rate_limit()
        .returning(|_, max, _| Ok((max + 1, false)));
    app.products.expect_list_products().never();

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/products", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_limiter_failure_denies_request() {
    let mut app = TestApp::new();
    app.limiter = MockRateLimiter::new();
    app.limiter
        .expect_check_rate_limit()
        .returning(|_, _, _| Err(AppError::internal("redis down")));

    let (status, _) = send(
        app.router(),
        request(Method::GET, "/api/products/linen-shirt", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Auth and catalog
// =============================================================================

#[tokio::test]
async fn test_register_validates_before_service() {
    let mut app = TestApp::new();
    app.auth.expect_register().never();

    let router = app.router();
    for body in [
        json!({ "name": "Ada", "email": "not-an-email", "password": "longenough" }),
        json!({ "name": "Ada", "email": "ada@example.com", "password": "short" }),
    ] {
        let (status, response) = send(
            router.clone(),
            request(Method::POST, "/api/auth/register", None, Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_session_returns_principal() {
    let (status, body) = send(
        TestApp::new().router(),
        request(Method::GET, "/api/auth/session", Some("admin-token"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["id"], ADMIN_ID.to_string());
}

#[tokio::test]
async fn test_product_detail_is_public() {
    let mut app = TestApp::new();
    app.products
        .expect_get_product()
        .withf(|slug| slug == "linen-shirt")
        .returning(|slug| Ok(sample_product(slug)));

    let (status, body) = send(
        app.router(),
        request(Method::GET, "/api/products/linen-shirt", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "linen-shirt");
}

#[tokio::test]
async fn test_reviews_read_public_write_authenticated() {
    let mut app = TestApp::new();
    app.products
        .expect_list_reviews()
        .returning(|_| Ok(Vec::new()));
    app.products.expect_add_review().never();

    let router = app.router();

    let (status, _) = send(
        router.clone(),
        request(Method::GET, "/api/products/linen-shirt/reviews", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        router,
        request(
            Method::POST,
            "/api/products/linen-shirt/reviews",
            None,
            Some(json!({ "rating": 5, "comment": "Great" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_review_rating_out_of_range_is_rejected() {
    let mut app = TestApp::new();
    app.products.expect_add_review().never();

    let (status, _) = send(
        app.router(),
        request(
            Method::POST,
            "/api/products/linen-shirt/reviews",
            Some("user-token"),
            Some(json!({ "rating": 6, "comment": "Too good" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_verify_payment_passes_reference_through() {
    let mut app = TestApp::new();
    app.payments
        .expect_verify()
        .withf(|reference| reference.as_deref() == Some("T123"))
        .times(1)
        .returning(|reference| {
            Ok(storefront_api::services::PaymentVerification {
                success: true,
                status: "success".to_string(),
                reference: reference.unwrap_or_default(),
                order_id: None,
            })
        });

    let (status, body) = send(
        app.router(),
        request(
            Method::POST,
            "/api/payment/verifyPayment",
            Some("user-token"),
            Some(json!({ "reference": "T123" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let mut app = TestApp::new();
    app.payments.expect_initialize().never();

    let (status, _) = send(
        app.router(),
        request(
            Method::POST,
            "/api/payment/checkout",
            Some("expired-token"),
            Some(json!({ "email": "ada@example.com", "amount": 10 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
