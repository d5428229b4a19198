//! Stock ledger service
//!
//! Batches are validated against their size's variety rules and expiry
//! rules before anything is written. Every quantity change is recorded as a
//! movement in the same storage call that changes the batch.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use shared::models::{
    AdjustStockInput, ExpiryStatus, MovementQuery, MovementType, Size, StockAlert, StockBatch,
    StockBatchInput, StockBatchOutcome, StockMovement,
};
use shared::types::ListQuery;
use shared::validation::{check_expiry, normalize_varieties};

use crate::config::StockConfig;
use crate::error::{AppError, AppResult};
use crate::repositories::{CatalogRepository, StockRepository, Stores};

#[derive(Clone)]
pub struct StockService {
    stock: Arc<dyn StockRepository>,
    catalog: Arc<dyn CatalogRepository>,
    config: StockConfig,
}

/// A batch ready to be written plus any non-blocking warnings
struct CheckedBatch {
    batch: StockBatch,
    warnings: Vec<String>,
}

impl StockService {
    pub fn new(stores: &Stores, config: &StockConfig) -> Self {
        Self {
            stock: stores.stock.clone(),
            catalog: stores.catalog.clone(),
            config: config.clone(),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn size_for(&self, size_id: Uuid) -> AppResult<Size> {
        self.catalog
            .get_size(size_id)
            .await?
            .ok_or_else(|| AppError::validation("size_id", "Selected size does not exist"))
    }

    /// Apply the variety and expiry rules to an input
    async fn check(&self, id: Uuid, input: StockBatchInput) -> AppResult<CheckedBatch> {
        input.validate()?;

        let size = self.size_for(input.size_id).await?;
        let varieties = normalize_varieties(&size, &input.varieties)?;
        let warning = check_expiry(
            input.production_date,
            input.expiry_date,
            Self::today(),
            input.confirm_expired,
            self.config.expiry_warning_days,
        )?;

        Ok(CheckedBatch {
            batch: StockBatch {
                id,
                size_id: size.id,
                size_name: size.name,
                varieties,
                quantity: input.quantity,
                min_stock: input.min_stock,
                reorder_point: input.reorder_point,
                production_date: input.production_date,
                expiry_date: input.expiry_date,
                last_updated: Utc::now(),
                remarks: input.remarks.trim().to_string(),
            },
            warnings: warning.into_iter().collect(),
        })
    }

    pub async fn list_batches(&self) -> AppResult<Vec<StockBatch>> {
        self.stock.list_batches().await
    }

    pub async fn get_batch(&self, id: Uuid) -> AppResult<StockBatch> {
        self.stock
            .get_batch(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))
    }

    /// Create a batch and its opening `in` movement
    pub async fn create_batch(
        &self,
        actor_id: Option<Uuid>,
        input: StockBatchInput,
    ) -> AppResult<StockBatchOutcome> {
        let CheckedBatch { batch, warnings } = self.check(Uuid::new_v4(), input).await?;

        let opening = StockMovement::record(
            &batch,
            MovementType::In,
            0,
            batch.quantity,
            actor_id,
            "Initial stock",
            batch.last_updated,
        );
        self.stock.insert_batch(&batch, &opening).await?;

        tracing::info!(
            "Created stock batch {} ({} x {})",
            batch.id,
            batch.size_name,
            batch.quantity
        );
        Ok(StockBatchOutcome {
            batch,
            movement: Some(opening),
            warnings,
        })
    }

    /// Replace a batch's fields. A changed quantity is recorded as an
    /// `adjustment` movement.
    pub async fn update_batch(
        &self,
        actor_id: Option<Uuid>,
        id: Uuid,
        input: StockBatchInput,
    ) -> AppResult<StockBatchOutcome> {
        let CheckedBatch { batch, warnings } = self.check(id, input).await?;

        let (batch, movement) = self
            .stock
            .replace_batch(&batch, actor_id, "Quantity edited")
            .await?
            .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;

        tracing::info!("Updated stock batch {}", batch.id);
        Ok(StockBatchOutcome {
            batch,
            movement,
            warnings,
        })
    }

    /// Add or remove units. Rejected without any change when the result
    /// would be negative.
    pub async fn adjust(
        &self,
        actor_id: Option<Uuid>,
        id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<StockBatchOutcome> {
        let remarks = match input.remarks.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ if input.delta > 0 => "Stock added".to_string(),
            _ => "Stock removed".to_string(),
        };

        let (batch, movement) = self
            .stock
            .adjust_batch(id, input.delta, actor_id, &remarks, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;

        tracing::info!(
            "Adjusted stock batch {} by {} ({} -> {})",
            batch.id,
            input.delta,
            movement.previous_stock,
            movement.current_stock
        );
        Ok(StockBatchOutcome {
            batch,
            movement: Some(movement),
            warnings: Vec::new(),
        })
    }

    /// Remove a batch; its history stays in the ledger flagged as deleted
    pub async fn delete_batch(&self, actor_id: Option<Uuid>, id: Uuid) -> AppResult<StockMovement> {
        let movement = self
            .stock
            .remove_batch(id, actor_id, "Batch deleted", Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))?;

        tracing::info!("Deleted stock batch {} with {} units on hand", id, movement.quantity);
        Ok(movement)
    }

    pub async fn list_movements(&self, query: &MovementQuery) -> AppResult<Vec<StockMovement>> {
        let limit = ListQuery { limit: query.limit }.limit_or(self.config.history_limit);
        self.stock
            .list_movements(query.stock_id, query.include_deleted.unwrap_or(true), limit)
            .await
    }

    /// Ledger entries for one batch, newest first
    pub async fn batch_history(&self, id: Uuid, limit: Option<u32>) -> AppResult<Vec<StockMovement>> {
        self.list_movements(&MovementQuery {
            stock_id: Some(id),
            limit,
            include_deleted: Some(true),
        })
        .await
    }

    fn alert(&self, batch: StockBatch, today: NaiveDate) -> StockAlert {
        StockAlert {
            level: batch.stock_level(),
            expiry: batch.expiry_status(today, self.config.expiry_warning_days),
            batch,
        }
    }

    /// Batches at or below their reorder point, emptiest first
    pub async fn low_stock(&self) -> AppResult<Vec<StockAlert>> {
        let today = Self::today();
        let mut alerts: Vec<StockAlert> = self
            .stock
            .list_batches()
            .await?
            .into_iter()
            .map(|b| self.alert(b, today))
            .filter(|a| a.level.is_low())
            .collect();
        alerts.sort_by_key(|a| a.batch.quantity);
        Ok(alerts)
    }

    /// Expired or soon-to-expire batches, earliest expiry first
    pub async fn expiring(&self) -> AppResult<Vec<StockAlert>> {
        let today = Self::today();
        let mut alerts: Vec<StockAlert> = self
            .stock
            .list_batches()
            .await?
            .into_iter()
            .map(|b| self.alert(b, today))
            .filter(|a| a.expiry != ExpiryStatus::Fresh)
            .collect();
        alerts.sort_by_key(|a| a.batch.expiry_date);
        Ok(alerts)
    }
}
