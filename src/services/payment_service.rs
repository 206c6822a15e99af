//! Payment service - bridges checkout to the payment gateway.
//!
//! Input is validated before any gateway call. Gateway failures surface as
//! upstream errors carrying the gateway's own message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::config::{
    PaymentConfig, MAX_PAYMENT_REFERENCE_LENGTH, MINOR_UNITS_PER_MAJOR, PAYMENT_METHOD_GATEWAY,
};
use crate::domain::{
    CurrentUser, LineItem, NewOrder, Order, PaymentInfo, PaymentStatus, ShippingInfo,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{InitializeTransaction, PaymentGateway, TransactionVerification, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Checkout initialization input
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Major units, as a JSON number or a numeric string
    #[serde(default)]
    #[schema(value_type = f64, example = 4500.0)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub shipping_info: Option<ShippingInfo>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// Checkout handle for the client, plus the recorded order if any
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
}

/// Outcome of a payment verification
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentVerification {
    pub success: bool,
    /// Gateway transaction status, e.g. `success` or `failed`
    pub status: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
}

/// Parse a major-unit amount from a JSON number or numeric string.
///
/// Missing, non-numeric, non-finite and non-positive values are rejected.
pub fn parse_amount(value: &serde_json::Value) -> AppResult<f64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AppError::validation("Amount must be a number"))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation("Amount must be greater than zero"));
    }

    Ok(amount)
}

/// Major units to minor units, rounded half away from zero.
///
/// Amounts that round to zero or do not fit in a `u64` are rejected.
pub fn to_minor_units(amount: f64) -> AppResult<u64> {
    let minor = (amount * MINOR_UNITS_PER_MAJOR).round();
    // u64::MAX as f64 is 2^64, the first value out of range
    if !minor.is_finite() || minor < 1.0 || minor >= u64::MAX as f64 {
        return Err(AppError::validation("Amount is out of range"));
    }
    Ok(minor as u64)
}

/// Sum of line subtotals; every line needs a positive quantity and price
pub fn items_total(items: &[LineItem]) -> AppResult<f64> {
    let mut total = 0.0;
    for item in items {
        if item.quantity == 0 {
            return Err(AppError::validation(format!(
                "Quantity for '{}' must be at least 1",
                item.name
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price <= 0.0 {
            return Err(AppError::validation(format!(
                "Unit price for '{}' must be greater than zero",
                item.name
            )));
        }
        total += item.subtotal();
    }
    Ok(total)
}

fn parse_reference(reference: Option<String>) -> AppResult<String> {
    let reference = reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::validation("Payment reference is required"))?;

    let well_formed = reference.len() <= MAX_PAYMENT_REFERENCE_LENGTH
        && !reference.starts_with('.')
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '='));
    if !well_formed {
        return Err(AppError::validation("Invalid payment reference"));
    }

    Ok(reference)
}

/// Whether a verified transaction covers the order in full
fn settles(verification: &TransactionVerification, order: &Order) -> bool {
    let amount_matches = match (verification.amount, to_minor_units(order.total_amount)) {
        (Some(paid), Ok(due)) => paid == due,
        _ => false,
    };
    let currency_matches = verification
        .currency
        .as_deref()
        .is_some_and(|currency| currency.eq_ignore_ascii_case(&order.currency));

    amount_matches && currency_matches
}

/// Payment service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn initialize(
        &self,
        actor: &CurrentUser,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutResponse>;

    async fn verify(&self, reference: Option<String>) -> AppResult<PaymentVerification>;
}

/// Concrete implementation of PaymentService
pub struct PaymentBridge {
    uow: Arc<dyn UnitOfWork>,
    gateway: Arc<dyn PaymentGateway>,
    config: PaymentConfig,
}

impl PaymentBridge {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        gateway: Arc<dyn PaymentGateway>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            uow,
            gateway,
            config,
        }
    }
}

#[async_trait]
impl PaymentService for PaymentBridge {
    async fn initialize(
        &self,
        actor: &CurrentUser,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        let amount = parse_amount(&request.amount)?;
        let minor_amount = to_minor_units(amount)?;
        let email = request.email.trim().to_string();
        if !email.validate_email() {
            return Err(AppError::validation("Invalid email format"));
        }

        let items = request.items.filter(|items| !items.is_empty());
        if let Some(items) = &items {
            let total = items_total(items)?;
            if to_minor_units(total)? != minor_amount {
                return Err(AppError::validation(format!(
                    "Amount {} does not match the order total {}",
                    amount, total
                )));
            }
        }

        let metadata = request
            .metadata
            .unwrap_or_else(|| serde_json::json!({ "user_id": actor.id }));

        let authorization = self
            .gateway
            .initialize(InitializeTransaction {
                email,
                amount: minor_amount,
                currency: self.config.currency.clone(),
                callback_url: self.config.callback_url.clone(),
                metadata: Some(metadata),
            })
            .await?;

        let order_id = match (items, request.shipping_info) {
            (Some(items), Some(shipping_info)) => {
                let order = self
                    .uow
                    .orders()
                    .create(NewOrder {
                        user_id: actor.id,
                        items,
                        total_amount: amount,
                        currency: self.config.currency.clone(),
                        shipping_info: Some(shipping_info),
                        payment: PaymentInfo {
                            method: PAYMENT_METHOD_GATEWAY.to_string(),
                            status: PaymentStatus::Pending,
                            reference: Some(authorization.reference.clone()),
                        },
                    })
                    .await?;
                tracing::info!(order_id = %order.id, reference = %authorization.reference, "Pending order recorded");
                Some(order.id)
            }
            _ => None,
        };

        Ok(CheckoutResponse {
            authorization_url: authorization.authorization_url,
            access_code: authorization.access_code,
            reference: authorization.reference,
            order_id,
        })
    }

    async fn verify(&self, reference: Option<String>) -> AppResult<PaymentVerification> {
        let reference = parse_reference(reference)?;

        let verification = self.gateway.verify(&reference).await?;
        let mut success = verification.is_successful();

        let payment_status = match verification.status.as_str() {
            "success" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        };

        let mut order_id = None;
        if let Some(order) = self.uow.orders().find_by_reference(&reference).await? {
            order_id = Some(order.id);

            let payment_status = match payment_status {
                Some(PaymentStatus::Paid) if !settles(&verification, &order) => {
                    tracing::warn!(
                        order_id = %order.id,
                        reference = %reference,
                        paid = ?verification.amount,
                        currency = ?verification.currency,
                        total = order.total_amount,
                        "Verified payment does not cover the order; leaving it unpaid"
                    );
                    success = false;
                    None
                }
                other => other,
            };

            if let Some(status) = payment_status.filter(|s| *s != order.payment.status) {
                self.uow.orders().update_payment_status(order.id, status).await?;
                tracing::info!(order_id = %order.id, payment_status = status.as_str(), "Order payment status updated");
            }
        }

        Ok(PaymentVerification {
            success,
            status: verification.status,
            reference,
            order_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_amount_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(12.345)).unwrap(), 12.345);
        assert_eq!(parse_amount(&json!("20")).unwrap(), 20.0);
        assert_eq!(parse_amount(&json!(" 7.5 ")).unwrap(), 7.5);
    }

    #[test]
    fn test_parse_amount_rejects_bad_values() {
        for value in [
            json!(0),
            json!(-5),
            json!("abc"),
            json!("NaN"),
            json!("inf"),
            json!(null),
            json!(true),
            json!([10]),
        ] {
            assert!(
                matches!(parse_amount(&value), Err(AppError::Validation(_))),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_minor_unit_conversion_rounds() {
        assert_eq!(to_minor_units(12.345).unwrap(), 1235);
        assert_eq!(to_minor_units(20.0).unwrap(), 2000);
        assert_eq!(to_minor_units(0.01).unwrap(), 1);
        assert_eq!(to_minor_units(19.99).unwrap(), 1999);
    }

    #[test]
    fn test_minor_unit_conversion_rejects_out_of_range() {
        for amount in [1e30, 1.9e17, 0.001, f64::INFINITY] {
            assert!(
                matches!(to_minor_units(amount), Err(AppError::Validation(_))),
                "accepted {}",
                amount
            );
        }
        assert_eq!(to_minor_units(1e15).unwrap(), 100_000_000_000_000_000);
    }

    fn item(quantity: u32, unit_price: f64) -> LineItem {
        LineItem {
            product_id: Uuid::new_v4(),
            name: "Linen shirt".to_string(),
            quantity,
            unit_price,
            color: None,
        }
    }

    #[test]
    fn test_items_total_sums_subtotals() {
        assert_eq!(items_total(&[item(2, 6.0), item(1, 3.5)]).unwrap(), 15.5);
    }

    #[test]
    fn test_items_total_rejects_bad_lines() {
        for bad in [item(0, 6.0), item(1, 0.0), item(1, -4.0), item(1, f64::NAN)] {
            assert!(matches!(items_total(&[bad]), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_reference_format() {
        assert_eq!(parse_reference(Some(" T123_abc-9 ".to_string())).unwrap(), "T123_abc-9");
        for bad in ["../../customer?perPage=100", "a/b", "..", "T 1", "ref#1"] {
            assert!(
                matches!(parse_reference(Some(bad.to_string())), Err(AppError::Validation(_))),
                "accepted {}",
                bad
            );
        }
        assert!(parse_reference(Some("x".repeat(MAX_PAYMENT_REFERENCE_LENGTH + 1))).is_err());
    }
}
