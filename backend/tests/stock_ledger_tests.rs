//! Stock ledger tests
//!
//! Batches, adjustments and deletions against the in-memory store:
//! - every quantity change leaves exactly one ledger entry
//! - quantities never go negative
//! - deleting a batch keeps its history, flagged as deleted

mod common;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use bakery_admin::error::AppError;
use bakery_admin::repositories::StockRepository;
use common::{batch_input, today, TestContext};
use shared::models::{AdjustStockInput, MovementQuery, MovementType, StockBatchInput};

fn adjust(delta: i32) -> AdjustStockInput {
    AdjustStockInput {
        delta,
        remarks: None,
    }
}

// ============================================================================
// Worked example
// ============================================================================

/// Big Bilao: create 10, add 5, reject -20, delete
#[tokio::test]
async fn test_big_bilao_lifecycle() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();
    let actor = Some(Uuid::new_v4());

    let created = stock
        .create_batch(actor, batch_input(size.id, &["Ube", "Cassava"], 10))
        .await
        .unwrap();
    let batch_id = created.batch.id;
    let opening = created.movement.unwrap();
    assert_eq!(opening.movement_type, MovementType::In);
    assert_eq!((opening.previous_stock, opening.current_stock), (0, 10));
    assert_eq!(created.batch.size_name, "Big Bilao");

    let added = stock.adjust(actor, batch_id, adjust(5)).await.unwrap();
    assert_eq!(added.batch.quantity, 15);
    let movement = added.movement.unwrap();
    assert_eq!(movement.movement_type, MovementType::In);
    assert_eq!((movement.previous_stock, movement.current_stock), (10, 15));

    let rejected = stock.adjust(actor, batch_id, adjust(-20)).await;
    assert!(matches!(rejected, Err(AppError::InsufficientStock(_))));
    assert_eq!(stock.get_batch(batch_id).await.unwrap().quantity, 15);
    assert_eq!(stock.batch_history(batch_id, None).await.unwrap().len(), 2);

    let deleted = stock.delete_batch(actor, batch_id).await.unwrap();
    assert_eq!(deleted.movement_type, MovementType::Deleted);
    assert_eq!(deleted.quantity, 15);
    assert!(deleted.is_deleted);
    assert!(matches!(stock.get_batch(batch_id).await, Err(AppError::NotFound(_))));

    let history = stock.batch_history(batch_id, None).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|m| m.is_deleted));
    assert_eq!(history[0].movement_type, MovementType::Deleted);
}

// ============================================================================
// Variety rules
// ============================================================================

#[tokio::test]
async fn test_variety_limit_enforced() {
    let ctx = TestContext::new();
    let size = ctx.size("Medium Bilao", 2).await;

    let result = ctx
        .stock()
        .create_batch(None, batch_input(size.id, &["Ube", "Cassava", "Pandan"], 5))
        .await;
    assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "varieties"));

    let result = ctx
        .stock()
        .create_batch(None, batch_input(size.id, &[], 5))
        .await;
    assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "varieties"));

    // Nothing was written
    assert!(ctx.stock().list_batches().await.unwrap().is_empty());
    let all = ctx.stock().list_movements(&MovementQuery::default()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_pinned_sizes_store_bibingka() {
    let ctx = TestContext::new();
    let solo = ctx.size("Solo", 1).await;

    let outcome = ctx
        .stock()
        .create_batch(None, batch_input(solo.id, &[], 12))
        .await
        .unwrap();
    assert_eq!(outcome.batch.varieties, vec!["Bibingka".to_string()]);

    let result = ctx
        .stock()
        .create_batch(None, batch_input(solo.id, &["Ube"], 3))
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_unknown_size_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .stock()
        .create_batch(None, batch_input(Uuid::new_v4(), &["Ube"], 3))
        .await;
    assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "size_id"));
}

// ============================================================================
// Expiry rules
// ============================================================================

#[tokio::test]
async fn test_expired_batch_needs_confirmation() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;

    let input = StockBatchInput {
        production_date: today() - Duration::days(3),
        expiry_date: today(),
        ..batch_input(size.id, &["Ube"], 4)
    };

    let result = ctx.stock().create_batch(None, input.clone()).await;
    assert!(matches!(result, Err(AppError::ConfirmationRequired { .. })));

    let confirmed = StockBatchInput {
        confirm_expired: true,
        ..input
    };
    let outcome = ctx.stock().create_batch(None, confirmed).await.unwrap();
    assert_eq!(outcome.warnings.len(), 1);

    let expiring = ctx.stock().expiring().await.unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].batch.id, outcome.batch.id);
}

#[tokio::test]
async fn test_batch_expiring_soon_saved_with_warning() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    for days in [1, 7] {
        let outcome = stock
            .create_batch(
                None,
                StockBatchInput {
                    expiry_date: today() + Duration::days(days),
                    ..batch_input(size.id, &["Ube"], 6)
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.movement.is_some());
        assert_eq!(stock.get_batch(outcome.batch.id).await.unwrap().quantity, 6);
    }

    // Outside the window: no warning
    let fresh = stock
        .create_batch(
            None,
            StockBatchInput {
                expiry_date: today() + Duration::days(8),
                ..batch_input(size.id, &["Ube"], 6)
            },
        )
        .await
        .unwrap();
    assert!(fresh.warnings.is_empty());
    assert_eq!(stock.list_batches().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_pinned_variety_accepted_in_any_case() {
    let ctx = TestContext::new();
    let solo = ctx.size("Solo", 1).await;

    let outcome = ctx
        .stock()
        .create_batch(None, batch_input(solo.id, &["bibingka"], 4))
        .await
        .unwrap();
    assert_eq!(outcome.batch.varieties, vec!["Bibingka".to_string()]);
}

#[tokio::test]
async fn test_expiry_must_follow_production() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;

    let input = StockBatchInput {
        production_date: today() + Duration::days(5),
        expiry_date: today() + Duration::days(2),
        ..batch_input(size.id, &["Ube"], 4)
    };
    let result = ctx.stock().create_batch(None, input).await;
    assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "expiry_date"));
}

// ============================================================================
// Edits and derived views
// ============================================================================

#[tokio::test]
async fn test_edit_records_quantity_change() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    let created = stock
        .create_batch(None, batch_input(size.id, &["Ube"], 10))
        .await
        .unwrap();
    let id = created.batch.id;

    // Same quantity: no ledger entry
    let same = stock
        .update_batch(None, id, batch_input(size.id, &["Ube", "Pandan"], 10))
        .await
        .unwrap();
    assert!(same.movement.is_none());
    assert_eq!(same.batch.varieties.len(), 2);

    let edited = stock
        .update_batch(None, id, batch_input(size.id, &["Ube"], 7))
        .await
        .unwrap();
    let movement = edited.movement.unwrap();
    assert_eq!(movement.movement_type, MovementType::Adjustment);
    assert_eq!((movement.previous_stock, movement.current_stock), (10, 7));
    assert_eq!(movement.quantity, 3);
}

#[tokio::test]
async fn test_low_stock_listing() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    let healthy = stock
        .create_batch(None, batch_input(size.id, &["Ube"], 20))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(size.id, &["Cassava"], 4))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(size.id, &["Pandan"], 0))
        .await
        .unwrap();

    let low = stock.low_stock().await.unwrap();
    assert_eq!(low.len(), 2);
    assert_eq!(low[0].batch.quantity, 0);
    assert!(low.iter().all(|a| a.batch.id != healthy.batch.id));
}

#[tokio::test]
async fn test_movement_listing_hides_deleted_on_request() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();

    let gone = stock
        .create_batch(None, batch_input(size.id, &["Ube"], 3))
        .await
        .unwrap();
    stock
        .create_batch(None, batch_input(size.id, &["Cassava"], 8))
        .await
        .unwrap();
    stock.delete_batch(None, gone.batch.id).await.unwrap();

    let everything = stock.list_movements(&MovementQuery::default()).await.unwrap();
    assert_eq!(everything.len(), 3);

    let live = stock
        .list_movements(&MovementQuery {
            include_deleted: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].current_stock, 8);

    let capped = stock
        .list_movements(&MovementQuery {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn test_capped_listing_keeps_newest_by_timestamp() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let batch = ctx
        .stock()
        .create_batch(None, batch_input(size.id, &["Ube"], 10))
        .await
        .unwrap()
        .batch;

    // Two writers: the later timestamp lands first
    let now = Utc::now();
    let (_, newest) = ctx
        .stores
        .stock
        .adjust_batch(batch.id, 2, None, "late", now + Duration::minutes(5))
        .await
        .unwrap()
        .unwrap();
    ctx.stores
        .stock
        .adjust_batch(batch.id, 1, None, "early", now + Duration::minutes(1))
        .await
        .unwrap()
        .unwrap();

    let capped = ctx
        .stock()
        .list_movements(&MovementQuery {
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].id, newest.id);

    let history = ctx.stock().batch_history(batch.id, Some(2)).await.unwrap();
    assert_eq!(history[0].id, newest.id);
    assert_eq!(history[1].remarks, "early");
}

#[tokio::test]
async fn test_zero_limit_uses_history_default() {
    let ctx = TestContext::new();
    let size = ctx.size("Big Bilao", 4).await;
    let stock = ctx.stock();
    for quantity in 1..=3 {
        stock
            .create_batch(None, batch_input(size.id, &["Ube"], quantity))
            .await
            .unwrap();
    }

    let all = stock
        .list_movements(&MovementQuery {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_missing_batch_is_not_found() {
    let ctx = TestContext::new();
    let stock = ctx.stock();
    assert!(matches!(
        stock.adjust(None, Uuid::new_v4(), adjust(1)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        stock.delete_batch(None, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Every accepted adjustment leaves one entry whose before/after
        /// matches the batch; rejected ones leave nothing
        #[test]
        fn prop_adjustments_keep_ledger_consistent(
            opening in 0i32..50,
            deltas in prop::collection::vec(-30i32..30, 1..15)
        ) {
            tokio_test::block_on(async {
                let ctx = TestContext::new();
                let size = ctx.size("Big Bilao", 4).await;
                let stock = ctx.stock();
                let batch = stock
                    .create_batch(None, batch_input(size.id, &["Ube"], opening))
                    .await
                    .unwrap()
                    .batch;

                let mut expected = opening;
                let mut entries = 1;
                for delta in deltas {
                    match stock.adjust(None, batch.id, adjust(delta)).await {
                        Ok(outcome) => {
                            let movement = outcome.movement.unwrap();
                            assert_eq!(movement.previous_stock, expected);
                            expected += delta;
                            entries += 1;
                            assert_eq!(movement.current_stock, expected);
                            assert_eq!(outcome.batch.quantity, expected);
                        }
                        Err(_) => assert!(delta == 0 || expected + delta < 0),
                    }
                    assert!(expected >= 0);
                }

                let history = stock.batch_history(batch.id, Some(100)).await.unwrap();
                assert_eq!(history.len(), entries);
                assert_eq!(stock.get_batch(batch.id).await.unwrap().quantity, expected);
            });
        }
    }
}
