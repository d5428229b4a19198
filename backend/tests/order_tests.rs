//! Order management tests
//!
//! Status writes, manual payment verification and the live order feed.

mod common;

use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

use bakery_admin::error::AppError;
use common::{order, TestContext};
use shared::models::{OrderQuery, OrderStatus, PaymentDecision, PaymentStatus};

#[tokio::test]
async fn test_orders_listed_newest_first() {
    let ctx = TestContext::new();
    ctx.memory.insert_order(order("ORD-001", "cash", 30)).await;
    ctx.memory.insert_order(order("ORD-002", "gcash", 5)).await;
    ctx.memory.insert_order(order("ORD-003", "GCash", 10)).await;

    let orders = ctx.orders().list_orders(&OrderQuery::default()).await.unwrap();
    let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
    assert_eq!(numbers, vec!["ORD-002", "ORD-003", "ORD-001"]);

    let gcash = ctx
        .orders()
        .list_orders(&OrderQuery {
            status: None,
            payment_method: Some("gcash".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(gcash.len(), 2);
}

#[tokio::test]
async fn test_any_status_reachable() {
    let ctx = TestContext::new();
    let placed = order("ORD-010", "cash", 1);
    let id = placed.id;
    ctx.memory.insert_order(placed).await;
    let orders = ctx.orders();

    let completed = orders.update_status(id, OrderStatus::Completed).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    // Back to pending is allowed
    let reopened = orders.update_status(id, OrderStatus::Pending).await.unwrap();
    assert_eq!(reopened.status, OrderStatus::Pending);
    assert!(reopened.updated_at >= completed.updated_at);

    assert!(matches!(
        orders.update_status(Uuid::new_v4(), OrderStatus::Ready).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_payment_verification() {
    let ctx = TestContext::new();
    let gcash = order("ORD-020", "gcash", 3);
    let cash = order("ORD-021", "cash", 2);
    let (gcash_id, cash_id) = (gcash.id, cash.id);
    ctx.memory.insert_order(gcash).await;
    ctx.memory.insert_order(cash).await;
    let orders = ctx.orders();

    let pending = orders.pending_verifications().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, gcash_id);

    let approved = orders.verify_payment(gcash_id, PaymentDecision::Approve).await.unwrap();
    assert_eq!(approved.payment_status, PaymentStatus::Paid);
    let rejected = orders.verify_payment(gcash_id, PaymentDecision::Reject).await.unwrap();
    assert_eq!(rejected.payment_status, PaymentStatus::Failed);
    let reset = orders.verify_payment(gcash_id, PaymentDecision::Reset).await.unwrap();
    assert_eq!(reset.payment_status, PaymentStatus::Pending);

    let wrong_method = orders.verify_payment(cash_id, PaymentDecision::Approve).await;
    assert!(matches!(wrong_method, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_feed_emits_snapshot_per_change() {
    let ctx = TestContext::new();
    ctx.memory.insert_order(order("ORD-030", "cash", 10)).await;

    let mut feed = ctx.orders().feed();
    let first = feed.next_snapshot().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);

    let placed = order("ORD-031", "gcash", 0);
    let id = placed.id;
    ctx.memory.insert_order(placed).await;
    let second = timeout(Duration::from_secs(1), feed.next_snapshot())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].order_number, "ORD-031");

    ctx.orders().update_status(id, OrderStatus::Ready).await.unwrap();
    let third = timeout(Duration::from_secs(1), feed.next_snapshot())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(third[0].status, OrderStatus::Ready);

    ctx.memory.delete_order(id).await;
    let fourth = timeout(Duration::from_secs(1), feed.next_snapshot())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(fourth.len(), 1);
}

#[tokio::test]
async fn test_feed_waits_for_changes() {
    let ctx = TestContext::new();
    let mut feed = ctx.orders().feed();
    assert!(feed.next_snapshot().await.unwrap().unwrap().is_empty());

    // No change, no snapshot
    let idle = timeout(Duration::from_millis(50), feed.next_snapshot()).await;
    assert!(idle.is_err());
}
