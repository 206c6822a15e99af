//! Order aggregate: line items, shipping, payment and delivery status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Order lifecycle label.
///
/// Any status may follow any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 5] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Processing,
        DeliveryStatus::Shipped,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Processing => "processing",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses after which a further change is suspicious
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// Whether customers are emailed when an order enters this status
    pub fn notifies_customer(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending)
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid status '{}'. Expected one of: pending, processing, shipped, delivered, cancelled",
                    s
                ))
            })
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Single product line on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub product_id: Uuid,
    #[schema(example = "Linen shirt")]
    pub name: String,
    #[schema(example = 2)]
    pub quantity: u32,
    #[schema(example = 4500.0)]
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "navy")]
    pub color: Option<String>,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Where and to whom an order ships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingInfo {
    #[schema(example = "Ada Obi")]
    pub full_name: String,
    #[schema(example = "+2348000000000")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[schema(example = "Lagos")]
    pub region: String,
    #[schema(example = "12 Marina Road")]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payment sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentInfo {
    #[schema(example = "paystack")]
    pub method: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Order aggregate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    #[schema(example = "NGN")]
    pub currency: String,
    pub shipping_info: Option<ShippingInfo>,
    pub payment: PaymentInfo,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Orders missing shipping info or line items cannot be fulfilled
    pub fn is_complete(&self) -> bool {
        self.shipping_info.is_some() && !self.items.is_empty()
    }

    /// Email recorded with the shipping details, if any
    pub fn shipping_email(&self) -> Option<&str> {
        self.shipping_info
            .as_ref()
            .and_then(|info| info.email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }

    /// Recipient name for notifications
    pub fn recipient_name(&self) -> &str {
        self.shipping_info
            .as_ref()
            .map(|info| info.full_name.as_str())
            .unwrap_or("customer")
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Fields needed to record a new order at checkout
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub currency: String,
    pub shipping_info: Option<ShippingInfo>,
    pub payment: PaymentInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: vec![LineItem {
                product_id: Uuid::new_v4(),
                name: "Shirt".to_string(),
                quantity: 2,
                unit_price: 10.5,
                color: None,
            }],
            total_amount: 21.0,
            currency: "NGN".to_string(),
            shipping_info: Some(ShippingInfo {
                full_name: "Ada".to_string(),
                phone: "0800".to_string(),
                email: Some("  ".to_string()),
                region: "Lagos".to_string(),
                street: "1 Road".to_string(),
                postal_code: None,
                notes: None,
            }),
            payment: PaymentInfo {
                method: "paystack".to_string(),
                status: PaymentStatus::Pending,
                reference: None,
            },
            delivery_status: DeliveryStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parsing() {
        for status in DeliveryStatus::ALL {
            assert_eq!(status.as_str().parse::<DeliveryStatus>().unwrap(), status);
        }
        assert!("returned".parse::<DeliveryStatus>().is_err());
        assert!("Shipped".parse::<DeliveryStatus>().is_err());
        assert!("".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn test_only_pending_is_silent() {
        assert!(!DeliveryStatus::Pending.notifies_customer());
        assert!(DeliveryStatus::Cancelled.notifies_customer());
    }

    #[test]
    fn test_blank_shipping_email_is_ignored() {
        let order = sample_order();
        assert!(order.shipping_email().is_none());
        assert_eq!(order.recipient_name(), "Ada");
    }

    #[test]
    fn test_completeness() {
        let mut order = sample_order();
        assert!(order.is_complete());
        order.items.clear();
        assert!(!order.is_complete());

        let mut order = sample_order();
        order.shipping_info = None;
        assert!(!order.is_complete());
    }

    #[test]
    fn test_serialized_status_is_lowercase() {
        let json = serde_json::to_value(sample_order()).unwrap();
        assert_eq!(json["delivery_status"], "pending");
        assert_eq!(json["payment"]["status"], "pending");
        assert_eq!(sample_order().items[0].subtotal(), 21.0);
    }
}
