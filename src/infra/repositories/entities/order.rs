//! Order table entity.
//!
//! Line items, shipping info and the payment sub-record live in JSONB
//! columns so each row stays a self-contained order document.

use sea_orm::entity::prelude::*;

use crate::domain::{DeliveryStatus, Order};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    #[sea_orm(column_type = "Double")]
    pub total_amount: f64,
    pub currency: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub shipping_info: Option<Json>,
    #[sea_orm(column_type = "JsonBinary")]
    pub payment: Json,
    /// Indexed copy of `payment.reference` for verification lookups
    #[sea_orm(nullable)]
    pub payment_reference: Option<String>,
    pub delivery_status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let corrupt = |field: &str, e: serde_json::Error| {
            AppError::internal(format!("Order {} has malformed {}: {}", model.id, field, e))
        };

        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            items: serde_json::from_value(model.items.clone()).map_err(|e| corrupt("items", e))?,
            total_amount: model.total_amount,
            currency: model.currency.clone(),
            shipping_info: model
                .shipping_info
                .clone()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| corrupt("shipping_info", e))?,
            payment: serde_json::from_value(model.payment.clone())
                .map_err(|e| corrupt("payment", e))?,
            delivery_status: model.delivery_status.parse::<DeliveryStatus>()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
