//! Dashboard and report tests

mod common;

use chrono::Duration;
use rust_decimal::Decimal;

use common::{batch_input, order, today, TestContext};
use shared::models::{AdjustStockInput, OrderStatus, PaymentStatus, StockBatchInput};

#[tokio::test]
async fn test_dashboard_summary() {
    let ctx = TestContext::new();
    let big = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    stock
        .create_batch(None, batch_input(big.id, &["Ube"], 20))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(big.id, &["Cassava"], 3))
        .await
        .unwrap();
    stock
        .create_batch(
            None,
            StockBatchInput {
                expiry_date: today() + Duration::days(2),
                ..batch_input(big.id, &["Pandan"], 10)
            },
        )
        .await
        .unwrap();

    let paid = order("ORD-100", "gcash", 20);
    let refunded = order("ORD-101", "gcash", 15);
    let (paid_id, refunded_id) = (paid.id, refunded.id);
    ctx.memory.insert_order(paid).await;
    ctx.memory.insert_order(refunded).await;
    ctx.memory.insert_order(order("ORD-102", "gcash", 10)).await;
    ctx.memory.insert_order(order("ORD-103", "cash", 5)).await;

    let orders = ctx.orders();
    orders.update_payment_status(paid_id, PaymentStatus::Paid).await.unwrap();
    orders.update_status(paid_id, OrderStatus::Completed).await.unwrap();
    orders
        .update_payment_status(refunded_id, PaymentStatus::Paid)
        .await
        .unwrap();
    orders
        .update_status(refunded_id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let summary = ctx.reporting().summary().await.unwrap();
    assert_eq!(summary.total_batches, 3);
    assert_eq!(summary.total_units, 33);
    assert_eq!(summary.low_stock_batches, 1);
    assert_eq!(summary.expiring_soon_batches, 1);
    assert_eq!(summary.expired_batches, 0);
    assert_eq!(summary.pending_verifications, 1);
    // Cancelled orders do not count toward revenue
    assert_eq!(summary.paid_revenue, Decimal::new(90000, 2));

    let count = |status: OrderStatus| {
        summary
            .orders_by_status
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
    };
    assert_eq!(count(OrderStatus::Pending), Some(2));
    assert_eq!(count(OrderStatus::Completed), Some(1));
    assert_eq!(count(OrderStatus::Ready), Some(0));
}

#[tokio::test]
async fn test_stock_grouped_by_size() {
    let ctx = TestContext::new();
    let big = ctx.size("Big Bilao", 4).await;
    let solo = ctx.size("Solo", 1).await;
    let stock = ctx.stock();

    stock
        .create_batch(None, batch_input(big.id, &["Ube"], 6))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(big.id, &["Cassava"], 4))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(solo.id, &[], 12))
        .await
        .unwrap();

    let by_size = ctx.reporting().stock_by_size().await.unwrap();
    assert_eq!(by_size.len(), 2);
    assert_eq!(by_size[0].size_name, "Big Bilao");
    assert_eq!((by_size[0].batches, by_size[0].units), (2, 10));
    assert_eq!((by_size[1].batches, by_size[1].units), (1, 12));
}

#[tokio::test]
async fn test_movement_series_covers_requested_days() {
    let ctx = TestContext::new();
    let big = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    let batch = stock
        .create_batch(None, batch_input(big.id, &["Ube"], 10))
        .await
        .unwrap()
        .batch;
    stock
        .adjust(
            None,
            batch.id,
            AdjustStockInput {
                delta: -4,
                remarks: Some("Sold at counter".to_string()),
            },
        )
        .await
        .unwrap();
    stock.delete_batch(None, batch.id).await.unwrap();

    let series = ctx.reporting().movement_series(Some(7)).await.unwrap();
    assert_eq!(series.len(), 7);
    assert_eq!(series[6].date, today());
    assert_eq!((series[6].units_in, series[6].units_out), (10, 4));
    assert!(series[..6].iter().all(|p| p.units_in == 0 && p.units_out == 0));

    let default_window = ctx.reporting().movement_series(None).await.unwrap();
    assert_eq!(default_window.len(), 30);
}
