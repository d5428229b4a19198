use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use shared::models::{Order, OrderChange, OrderQuery, OrderStatus, PaymentStatus};

use super::PgStore;
use crate::error::AppResult;
use crate::repositories::OrderRepository;

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
     items, total_amount, status, payment_status, payment_method, payment_reference, \
     payment_proof_url, delivery_address, notes, order_date, updated_at";

// Writes here are announced by the orders trigger, not by this store
#[async_trait]
impl OrderRepository for PgStore {
    async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {} FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR lower(payment_method) = lower($2))
            ORDER BY order_date DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(query.status)
        .bind(&query.payment_method)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus, at: DateTime<Utc>) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET payment_status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.order_changes.subscribe()
    }
}
