//! Order repository.
//!
//! Writes are last-write-wins: there is no version column and no
//! compare-and-swap on status changes.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::order::{self, ActiveModel, Entity as OrderEntity};
use super::map_write_error;
use crate::domain::{DeliveryStatus, NewOrder, Order, PaymentInfo, PaymentStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    async fn find_by_reference(&self, reference: &str) -> AppResult<Option<Order>>;

    /// Newest first, optionally restricted to one delivery status
    async fn list(
        &self,
        params: &PaginationParams,
        status: Option<DeliveryStatus>,
    ) -> AppResult<(Vec<Order>, u64)>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    async fn create(&self, order: NewOrder) -> AppResult<Order>;

    async fn update_delivery_status(&self, id: Uuid, status: DeliveryStatus) -> AppResult<Order>;

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> AppResult<Order>;
}

/// SeaORM-backed order repository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::internal(format!("Order serialization failed: {}", e)))
}

fn not_updated(err: DbErr) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::not_found("Order"),
        other => AppError::from(other),
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        OrderEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> AppResult<Option<Order>> {
        OrderEntity::find()
            .filter(order::Column::PaymentReference.eq(reference))
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn list(
        &self,
        params: &PaginationParams,
        status: Option<DeliveryStatus>,
    ) -> AppResult<(Vec<Order>, u64)> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::DeliveryStatus.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let orders = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((orders, total))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    async fn create(&self, new_order: NewOrder) -> AppResult<Order> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_order.user_id),
            items: Set(to_json(&new_order.items)?),
            total_amount: Set(new_order.total_amount),
            currency: Set(new_order.currency),
            shipping_info: Set(new_order.shipping_info.as_ref().map(to_json).transpose()?),
            payment_reference: Set(new_order.payment.reference.clone()),
            payment: Set(to_json(&new_order.payment)?),
            delivery_status: Set(DeliveryStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "Order"))?;
        Order::try_from(model)
    }

    async fn update_delivery_status(&self, id: Uuid, status: DeliveryStatus) -> AppResult<Order> {
        let active_model = ActiveModel {
            id: Set(id),
            delivery_status: Set(status.to_string()),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(not_updated)?;
        Order::try_from(model)
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> AppResult<Order> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        let payment = PaymentInfo {
            status,
            ..current.payment
        };
        let active_model = ActiveModel {
            id: Set(id),
            payment: Set(to_json(&payment)?),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(not_updated)?;
        Order::try_from(model)
    }
}
