//! Dashboard aggregations over the catalog, stock ledger and orders

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::{ExpiryStatus, MovementType, OrderQuery, OrderStatus, PaymentStatus, StockMovement};
use shared::types::DateRange;

use crate::config::{PaymentsConfig, StockConfig};
use crate::error::AppResult;
use crate::repositories::{CatalogRepository, OrderRepository, StockRepository, Stores};

/// Default window for the movement series
pub const DEFAULT_SERIES_DAYS: u32 = 30;
const MAX_SERIES_DAYS: u32 = 366;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    catalog: Arc<dyn CatalogRepository>,
    stock: Arc<dyn StockRepository>,
    orders: Arc<dyn OrderRepository>,
    stock_config: StockConfig,
    payments: PaymentsConfig,
}

/// Order count for one status
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_categories: usize,
    pub total_batches: usize,
    pub total_units: i64,
    pub low_stock_batches: usize,
    pub expiring_soon_batches: usize,
    pub expired_batches: usize,
    pub orders_by_status: Vec<StatusCount>,
    pub pending_verifications: usize,
    pub paid_revenue: Decimal,
}

/// Units moved in and out on one day
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MovementPoint {
    pub date: NaiveDate,
    pub units_in: i64,
    pub units_out: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SizeStock {
    pub size_name: String,
    pub batches: usize,
    pub units: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub days: Option<u32>,
}

/// Bucket movements into one point per day of `range`, oldest first.
/// Batch deletions are removals of the record, not sales, and are skipped.
pub fn movement_series(range: DateRange, movements: &[StockMovement]) -> Vec<MovementPoint> {
    let mut by_day: HashMap<NaiveDate, (i64, i64)> = HashMap::new();
    for movement in movements {
        if movement.movement_type == MovementType::Deleted {
            continue;
        }
        let day = movement.timestamp.date_naive();
        if !range.contains(day) {
            continue;
        }
        let entry = by_day.entry(day).or_default();
        let delta = i64::from(movement.delta());
        if delta >= 0 {
            entry.0 += delta;
        } else {
            entry.1 += -delta;
        }
    }

    range
        .days()
        .map(|date| {
            let (units_in, units_out) = by_day.get(&date).copied().unwrap_or_default();
            MovementPoint {
                date,
                units_in,
                units_out,
            }
        })
        .collect()
}

impl ReportingService {
    pub fn new(stores: &Stores, stock_config: &StockConfig, payments: &PaymentsConfig) -> Self {
        Self {
            catalog: stores.catalog.clone(),
            stock: stores.stock.clone(),
            orders: stores.orders.clone(),
            stock_config: stock_config.clone(),
            payments: payments.clone(),
        }
    }

    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let today = Utc::now().date_naive();
        let products = self.catalog.list_products(None).await?;
        let categories = self.catalog.list_categories().await?;
        let batches = self.stock.list_batches().await?;
        let orders = self.orders.list_orders(&OrderQuery::default()).await?;

        let mut expiring_soon = 0;
        let mut expired = 0;
        for batch in &batches {
            match batch.expiry_status(today, self.stock_config.expiry_warning_days) {
                ExpiryStatus::Expired => expired += 1,
                ExpiryStatus::ExpiringSoon { .. } => expiring_soon += 1,
                ExpiryStatus::Fresh => {}
            }
        }

        let orders_by_status = OrderStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: orders.iter().filter(|o| o.status == *status).count(),
            })
            .collect();

        let pending_verifications = orders
            .iter()
            .filter(|o| {
                o.payment_status == PaymentStatus::Pending
                    && o.payment_method
                        .eq_ignore_ascii_case(&self.payments.verification_method)
            })
            .count();

        let paid_revenue = orders
            .iter()
            .filter(|o| o.payment_status == PaymentStatus::Paid && o.status != OrderStatus::Cancelled)
            .map(|o| o.total_amount)
            .sum();

        Ok(DashboardSummary {
            total_products: products.len(),
            total_categories: categories.len(),
            total_batches: batches.len(),
            total_units: batches.iter().map(|b| i64::from(b.quantity)).sum(),
            low_stock_batches: batches.iter().filter(|b| b.stock_level().is_low()).count(),
            expiring_soon_batches: expiring_soon,
            expired_batches: expired,
            orders_by_status,
            pending_verifications,
            paid_revenue,
        })
    }

    /// Per-day units in and out over the last `days` days including today
    pub async fn movement_series(&self, days: Option<u32>) -> AppResult<Vec<MovementPoint>> {
        let days = days
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_SERIES_DAYS)
            .min(MAX_SERIES_DAYS);

        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days) - 1);
        let since = Utc.from_utc_datetime(&start.and_time(NaiveTime::default()));

        let movements = self.stock.movements_since(since).await?;
        Ok(movement_series(DateRange { start, end }, &movements))
    }

    /// Units on hand grouped by size name
    pub async fn stock_by_size(&self) -> AppResult<Vec<SizeStock>> {
        let mut by_size: BTreeMap<String, (usize, i64)> = BTreeMap::new();
        for batch in self.stock.list_batches().await? {
            let entry = by_size.entry(batch.size_name).or_default();
            entry.0 += 1;
            entry.1 += i64::from(batch.quantity);
        }

        Ok(by_size
            .into_iter()
            .map(|(size_name, (batches, units))| SizeStock {
                size_name,
                batches,
                units,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StockBatch;
    use uuid::Uuid;

    fn batch() -> StockBatch {
        StockBatch {
            id: Uuid::new_v4(),
            size_id: Uuid::new_v4(),
            size_name: "Big Bilao".to_string(),
            varieties: vec!["Ube".to_string()],
            quantity: 0,
            min_stock: 0,
            reorder_point: 0,
            production_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
            last_updated: Utc::now(),
            remarks: String::new(),
        }
    }

    fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_series_is_zero_filled_and_ordered() {
        let b = batch();
        let movements = vec![
            StockMovement::record(&b, MovementType::In, 0, 10, None, "Initial stock", at(2, 8)),
            StockMovement::record(&b, MovementType::In, 10, 15, None, "", at(2, 12)),
            StockMovement::record(&b, MovementType::Out, 15, 12, None, "", at(4, 9)),
            StockMovement::record(&b, MovementType::Adjustment, 12, 7, None, "", at(4, 10)),
            StockMovement::record(&b, MovementType::Deleted, 7, 0, None, "", at(4, 11)),
            // Outside the window
            StockMovement::record(&b, MovementType::In, 0, 99, None, "", at(9, 9)),
        ];
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
        };

        let series = movement_series(range, &movements);
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].date, range.start);
        assert_eq!((series[0].units_in, series[0].units_out), (0, 0));
        assert_eq!((series[1].units_in, series[1].units_out), (15, 0));
        assert_eq!((series[3].units_in, series[3].units_out), (0, 8));
        assert_eq!((series[4].units_in, series[4].units_out), (0, 0));
    }
}
