//! Order service - customer order lookups and the delivery-status workflow.
//!
//! A status update runs in two phases. The first validates, authorizes and
//! persists the new status. The second queues the customer notification and
//! reports its outcome separately: once the status is stored, a queueing
//! problem never turns the request into a failure.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CurrentUser, DeliveryStatus, Order};
use crate::errors::{AppError, AppResult};
use crate::infra::{NotificationQueue, UnitOfWork};
use crate::jobs::EmailJob;
use crate::types::{Paginated, PaginationParams};
use crate::utils::templates::order_status_email;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ORDER_UNAVAILABLE: &str = "Order not found or incomplete";
const SKIP_PENDING: &str = "pending status";
const SKIP_NO_RECIPIENT: &str = "no recipient";

/// What happened to the customer notification
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotificationOutcome {
    /// An email job was written to the queue
    Queued { job_id: String, recipient: String },
    /// No email was due: `pending status` or `no recipient`
    Skipped { reason: String },
    /// The status was saved but the email could not be queued
    Failed { error: String },
}

impl NotificationOutcome {
    fn skipped(reason: &str) -> Self {
        NotificationOutcome::Skipped {
            reason: reason.to_string(),
        }
    }
}

/// Result of a delivery-status update
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusUpdate {
    pub order: Order,
    pub notification: NotificationOutcome,
}

/// Order service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Admin-only delivery status change with customer notification
    async fn update_delivery_status(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        status: &str,
    ) -> AppResult<StatusUpdate>;

    /// Single order, visible to its owner and to admins
    async fn get_order(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order>;

    /// The caller's own orders, newest first
    async fn list_user_orders(&self, actor: &CurrentUser) -> AppResult<Vec<Order>>;

    /// All orders, optionally filtered by delivery status
    async fn list_orders(
        &self,
        params: &PaginationParams,
        status: Option<String>,
    ) -> AppResult<Paginated<Order>>;
}

/// Concrete implementation of OrderService
pub struct OrderWorkflow {
    uow: Arc<dyn UnitOfWork>,
    queue: Arc<dyn NotificationQueue>,
    store_url: String,
}

impl OrderWorkflow {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        queue: Arc<dyn NotificationQueue>,
        store_url: impl Into<String>,
    ) -> Self {
        Self {
            uow,
            queue,
            store_url: store_url.into(),
        }
    }

    /// Shipping email first, then the owner's account email
    async fn resolve_recipient(&self, order: &Order) -> AppResult<Option<String>> {
        if let Some(email) = order.shipping_email() {
            return Ok(Some(email.trim().to_string()));
        }

        let owner = self.uow.users().find_by_id(order.user_id).await?;
        Ok(owner.map(|user| user.email))
    }

    async fn notify(
        &self,
        order: &Order,
        status: DeliveryStatus,
        recipient: String,
    ) -> NotificationOutcome {
        // Only pending has no template
        let Some(email) = order_status_email(order, status, &self.store_url) else {
            return NotificationOutcome::skipped(SKIP_PENDING);
        };

        let job = EmailJob::new(recipient.clone(), email.subject, email.text).with_html(email.html);
        match self.queue.enqueue(job).await {
            Ok(job_id) => {
                tracing::info!(order_id = %order.id, job_id = %job_id, status = %status, "Status email queued");
                NotificationOutcome::Queued { job_id, recipient }
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, status = %status, error = %e, "Failed to queue status email");
                NotificationOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

fn parse_order_id(order_id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(order_id.trim())
        .map_err(|_| AppError::validation(format!("Invalid order id '{}'", order_id)))
}

#[async_trait]
impl OrderService for OrderWorkflow {
    async fn update_delivery_status(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        status: &str,
    ) -> AppResult<StatusUpdate> {
        if !actor.is_admin() {
            tracing::warn!(actor = %actor.id, order_id = %order_id, "Non-admin attempted status update");
            return Err(AppError::Forbidden);
        }

        let id = parse_order_id(order_id)?;
        let status: DeliveryStatus = status.parse()?;

        let order = self
            .uow
            .orders()
            .find_by_id(id)
            .await?
            .filter(Order::is_complete)
            .ok_or_else(|| AppError::NotFound(ORDER_UNAVAILABLE.to_string()))?;

        let recipient = if status.notifies_customer() {
            self.resolve_recipient(&order).await?
        } else {
            None
        };

        if status.notifies_customer() && recipient.is_some() && !self.queue.is_ready() {
            return Err(AppError::misconfigured(
                "Email transport is not configured; refusing to update order status",
            ));
        }

        let previous = order.delivery_status;
        if previous.is_terminal() && previous != status {
            tracing::warn!(order_id = %id, from = %previous, to = %status, "Order leaving terminal status");
        }

        let order = self.uow.orders().update_delivery_status(id, status).await?;
        tracing::info!(actor = %actor.id, order_id = %id, from = %previous, to = %status, "Delivery status updated");

        let notification = match recipient {
            _ if !status.notifies_customer() => NotificationOutcome::skipped(SKIP_PENDING),
            None => NotificationOutcome::skipped(SKIP_NO_RECIPIENT),
            Some(recipient) => self.notify(&order, status, recipient).await,
        };

        Ok(StatusUpdate {
            order,
            notification,
        })
    }

    async fn get_order(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let id = parse_order_id(order_id)?;
        let order = self
            .uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        // Other customers' orders look the same as missing ones
        if !actor.is_admin() && !order.is_owned_by(actor.id) {
            return Err(AppError::not_found("Order"));
        }

        Ok(order)
    }

    async fn list_user_orders(&self, actor: &CurrentUser) -> AppResult<Vec<Order>> {
        self.uow.orders().list_for_user(actor.id).await
    }

    async fn list_orders(
        &self,
        params: &PaginationParams,
        status: Option<String>,
    ) -> AppResult<Paginated<Order>> {
        let status = status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<DeliveryStatus>())
            .transpose()?;

        let (orders, total) = self.uow.orders().list(params, status).await?;
        Ok(Paginated::new(orders, params, total))
    }
}
