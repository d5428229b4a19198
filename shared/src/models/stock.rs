//! Stock ledger models: sizes, varieties, batches and movements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A sellable size, e.g. "Big Bilao"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Size {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// Maximum number of varieties a single batch of this size may carry
    pub max_varieties: i32,
    /// Restricted variety list; empty means any variety is allowed
    pub allowed_varieties: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a size
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SizeInput {
    #[validate(length(min = 1, max = 100, message = "Size name is required"))]
    pub name: String,
    pub price: Decimal,
    #[validate(range(min = 1, message = "A size must allow at least one variety"))]
    pub max_varieties: i32,
    #[serde(default)]
    pub allowed_varieties: Vec<String>,
}

/// A flavor/type that can be attached to a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Variety {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VarietyInput {
    #[validate(length(min = 1, max = 100, message = "Variety name is required"))]
    pub name: String,
}

/// A tracked quantity of one size/variety-set combination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockBatch {
    pub id: Uuid,
    pub size_id: Uuid,
    pub size_name: String,
    pub varieties: Vec<String>,
    pub quantity: i32,
    pub min_stock: i32,
    pub reorder_point: i32,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub last_updated: DateTime<Utc>,
    pub remarks: String,
}

impl StockBatch {
    /// Low-stock classification against this batch's thresholds
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.quantity, self.min_stock, self.reorder_point)
    }

    /// Expiry-window classification relative to `today`
    pub fn expiry_status(&self, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
        ExpiryStatus::classify(self.expiry_date, today, warning_days)
    }
}

/// Input for creating or replacing a stock batch
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockBatchInput {
    pub size_id: Uuid,
    #[serde(default)]
    pub varieties: Vec<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    #[serde(default)]
    pub min_stock: i32,
    #[validate(range(min = 0, message = "Reorder point cannot be negative"))]
    #[serde(default)]
    pub reorder_point: i32,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub remarks: String,
    /// Acknowledges that the expiry date is today or already past
    #[serde(default)]
    pub confirm_expired: bool,
}

/// Input for a signed quantity adjustment
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStockInput {
    pub delta: i32,
    pub remarks: Option<String>,
}

/// Ledger movement types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "movement_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Deleted,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
            MovementType::Deleted => "deleted",
        }
    }

    /// Movement type for a signed quantity change
    pub fn for_delta(delta: i32) -> Self {
        if delta >= 0 {
            MovementType::In
        } else {
            MovementType::Out
        }
    }
}

/// Append-only ledger entry recording one quantity change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: Uuid,
    pub stock_id: Uuid,
    pub size_name: String,
    pub varieties: Vec<String>,
    pub movement_type: MovementType,
    /// Magnitude of the change
    pub quantity: i32,
    pub previous_stock: i32,
    pub current_stock: i32,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub remarks: String,
    /// Set when the owning batch has been removed
    pub is_deleted: bool,
}

impl StockMovement {
    /// Build a movement for `batch` going from `previous` to `current`
    pub fn record(
        batch: &StockBatch,
        movement_type: MovementType,
        previous: i32,
        current: i32,
        actor_id: Option<Uuid>,
        remarks: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_id: batch.id,
            size_name: batch.size_name.clone(),
            varieties: batch.varieties.clone(),
            movement_type,
            quantity: (current - previous).abs(),
            previous_stock: previous,
            current_stock: current,
            timestamp: at,
            actor_id,
            remarks: remarks.into(),
            is_deleted: false,
        }
    }

    /// Signed change this movement applied
    pub fn delta(&self) -> i32 {
        self.current_stock - self.previous_stock
    }
}

/// Filter for listing ledger entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementQuery {
    pub stock_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub include_deleted: Option<bool>,
}

/// Result of a batch write: the batch, the ledger entry it produced, and any
/// non-blocking warnings for the operator
#[derive(Debug, Clone, Serialize)]
pub struct StockBatchOutcome {
    pub batch: StockBatch,
    pub movement: Option<StockMovement>,
    pub warnings: Vec<String>,
}

/// Quantity-on-hand classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    /// At or below the minimum-stock threshold
    Critical,
    /// At or below the reorder point
    Reorder,
    Healthy,
}

impl StockLevel {
    pub fn classify(quantity: i32, min_stock: i32, reorder_point: i32) -> Self {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if quantity <= min_stock {
            StockLevel::Critical
        } else if quantity <= reorder_point {
            StockLevel::Reorder
        } else {
            StockLevel::Healthy
        }
    }

    pub fn is_low(&self) -> bool {
        !matches!(self, StockLevel::Healthy)
    }
}

/// Expiry-window classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ExpiryStatus {
    /// Expiry date is today or already past
    Expired,
    ExpiringSoon { days_left: i64 },
    Fresh,
}

impl ExpiryStatus {
    pub fn classify(expiry_date: NaiveDate, today: NaiveDate, warning_days: i64) -> Self {
        let days_left = (expiry_date - today).num_days();
        if days_left <= 0 {
            ExpiryStatus::Expired
        } else if days_left <= warning_days {
            ExpiryStatus::ExpiringSoon { days_left }
        } else {
            ExpiryStatus::Fresh
        }
    }
}

/// A batch annotated with its derived stock views
#[derive(Debug, Clone, Serialize)]
pub struct StockAlert {
    #[serde(flatten)]
    pub batch: StockBatch,
    pub level: StockLevel,
    pub expiry: ExpiryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stock_level_classification() {
        assert_eq!(StockLevel::classify(0, 5, 10), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(5, 5, 10), StockLevel::Critical);
        assert_eq!(StockLevel::classify(8, 5, 10), StockLevel::Reorder);
        assert_eq!(StockLevel::classify(11, 5, 10), StockLevel::Healthy);
        assert!(!StockLevel::Healthy.is_low());
        assert!(StockLevel::Reorder.is_low());
    }

    #[test]
    fn test_expiry_classification() {
        let today = date(2024, 6, 10);
        assert_eq!(ExpiryStatus::classify(date(2024, 6, 10), today, 7), ExpiryStatus::Expired);
        assert_eq!(ExpiryStatus::classify(date(2024, 6, 1), today, 7), ExpiryStatus::Expired);
        assert_eq!(
            ExpiryStatus::classify(date(2024, 6, 17), today, 7),
            ExpiryStatus::ExpiringSoon { days_left: 7 }
        );
        assert_eq!(ExpiryStatus::classify(date(2024, 6, 18), today, 7), ExpiryStatus::Fresh);
    }

    #[test]
    fn test_movement_type_for_delta() {
        assert_eq!(MovementType::for_delta(5), MovementType::In);
        assert_eq!(MovementType::for_delta(-1), MovementType::Out);
        assert_eq!(MovementType::Deleted.as_str(), "deleted");
    }
}
