//! Order management, payment verification and the live order feed

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use shared::models::{
    Order, OrderChange, OrderQuery, OrderStatus, PaymentDecision, PaymentStatus,
};

use crate::config::PaymentsConfig;
use crate::error::{AppError, AppResult};
use crate::repositories::{OrderRepository, Stores};

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    payments: PaymentsConfig,
}

impl OrderService {
    pub fn new(stores: &Stores, payments: &PaymentsConfig) -> Self {
        Self {
            orders: stores.orders.clone(),
            payments: payments.clone(),
        }
    }

    /// Newest-first by order date
    pub async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        self.orders.list_orders(query).await
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<Order> {
        self.orders
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Any status may follow any other
    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let order = self
            .orders
            .set_status(id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        tracing::info!("Order {} moved to {}", order.order_number, status.as_str());
        Ok(order)
    }

    pub async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> AppResult<Order> {
        let order = self
            .orders
            .set_payment_status(id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        tracing::info!("Order {} payment set to {:?}", order.order_number, status);
        Ok(order)
    }

    /// Orders paid with the manually verified method
    pub async fn pending_verifications(&self) -> AppResult<Vec<Order>> {
        self.orders
            .list_orders(&OrderQuery {
                status: None,
                payment_method: Some(self.payments.verification_method.clone()),
            })
            .await
    }

    /// Approve, reject or reset a manually verified payment
    pub async fn verify_payment(&self, id: Uuid, decision: PaymentDecision) -> AppResult<Order> {
        let order = self.get_order(id).await?;
        if !order
            .payment_method
            .eq_ignore_ascii_case(&self.payments.verification_method)
        {
            return Err(AppError::validation(
                "payment_method",
                format!(
                    "Only {} payments go through manual verification",
                    self.payments.verification_method
                ),
            ));
        }

        self.update_payment_status(id, decision.target_status()).await
    }

    /// Subscribe before the first snapshot so no change is missed
    pub fn feed(&self) -> OrderFeed {
        OrderFeed {
            orders: self.orders.clone(),
            changes: self.orders.subscribe(),
            primed: false,
        }
    }
}

/// Full order snapshots: one on connect, then one per change notification
pub struct OrderFeed {
    orders: Arc<dyn OrderRepository>,
    changes: broadcast::Receiver<OrderChange>,
    primed: bool,
}

impl OrderFeed {
    /// Wait for the next snapshot. `None` once the change channel closes.
    pub async fn next_snapshot(&mut self) -> Option<AppResult<Vec<Order>>> {
        if self.primed {
            match self.changes.recv().await {
                Ok(change) => {
                    tracing::debug!("Order {} {}", change.order_id, change.operation);
                }
                // One fresh snapshot covers every skipped notification
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Order feed lagged by {} notifications", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
        self.primed = true;

        Some(self.orders.list_orders(&OrderQuery::default()).await)
    }
}
