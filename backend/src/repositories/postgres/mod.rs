//! PostgreSQL backend

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use shared::models::OrderChange;

use super::{Probe, ORDER_FEED_CAPACITY};
use crate::error::{AppError, AppResult};

mod catalog;
mod content;
mod orders;
mod stock;
mod users;

/// NOTIFY channel written by the `orders` table trigger
pub const ORDER_CHANNEL: &str = "order_changes";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    order_changes: broadcast::Sender<OrderChange>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        let (order_changes, _) = broadcast::channel(ORDER_FEED_CAPACITY);
        Self { pool, order_changes }
    }

    /// Forward order NOTIFY payloads to feed subscribers until the
    /// connection fails
    pub fn spawn_order_listener(&self) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let sender = self.order_changes.clone();
        tokio::spawn(async move {
            if let Err(e) = forward_order_changes(pool, sender).await {
                tracing::error!("Order change listener stopped: {}", e);
            }
        })
    }
}

async fn forward_order_changes(
    pool: PgPool,
    sender: broadcast::Sender<OrderChange>,
) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(&pool).await?;
    listener.listen(ORDER_CHANNEL).await?;
    tracing::info!("Listening for order changes on '{}'", ORDER_CHANNEL);

    loop {
        let notification = listener.recv().await?;
        match serde_json::from_str::<OrderChange>(notification.payload()) {
            Ok(change) => {
                tracing::debug!("Order {} changed ({})", change.order_id, change.operation);
                let _ = sender.send(change);
            }
            Err(e) => tracing::warn!("Ignoring malformed order notification: {}", e),
        }
    }
}

/// Map constraint violations onto API errors
pub(crate) fn constraint_error(err: sqlx::Error, field: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateEntry(field.to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Conflict(format!("{} is still referenced by other records", field))
        }
        _ => AppError::DatabaseError(err),
    }
}

#[async_trait]
impl Probe for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
