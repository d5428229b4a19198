use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use shared::models::{MovementType, StockBatch, StockMovement};
use shared::validation::apply_delta;

use super::PgStore;
use crate::error::AppResult;
use crate::repositories::StockRepository;

const BATCH_COLUMNS: &str = "id, size_id, size_name, varieties, quantity, min_stock, reorder_point, \
     production_date, expiry_date, last_updated, remarks";
const MOVEMENT_COLUMNS: &str = "id, stock_id, size_name, varieties, movement_type, quantity, \
     previous_stock, current_stock, timestamp, actor_id, remarks, is_deleted";

async fn insert_movement(conn: &mut PgConnection, movement: &StockMovement) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, stock_id, size_name, varieties, movement_type, quantity,
                                     previous_stock, current_stock, timestamp, actor_id, remarks,
                                     is_deleted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(movement.id)
    .bind(movement.stock_id)
    .bind(&movement.size_name)
    .bind(&movement.varieties)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.current_stock)
    .bind(movement.timestamp)
    .bind(movement.actor_id)
    .bind(&movement.remarks)
    .bind(movement.is_deleted)
    .execute(conn)
    .await?;
    Ok(())
}

async fn lock_batch(conn: &mut PgConnection, id: Uuid) -> Result<Option<StockBatch>, sqlx::Error> {
    sqlx::query_as::<_, StockBatch>(&format!(
        "SELECT {} FROM stock_batches WHERE id = $1 FOR UPDATE",
        BATCH_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

#[async_trait]
impl StockRepository for PgStore {
    async fn list_batches(&self) -> AppResult<Vec<StockBatch>> {
        let batches = sqlx::query_as::<_, StockBatch>(&format!(
            "SELECT {} FROM stock_batches ORDER BY last_updated DESC",
            BATCH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(batches)
    }

    async fn get_batch(&self, id: Uuid) -> AppResult<Option<StockBatch>> {
        let batch = sqlx::query_as::<_, StockBatch>(&format!(
            "SELECT {} FROM stock_batches WHERE id = $1",
            BATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(batch)
    }

    async fn insert_batch(&self, batch: &StockBatch, opening: &StockMovement) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO stock_batches (id, size_id, size_name, varieties, quantity, min_stock,
                                       reorder_point, production_date, expiry_date, last_updated,
                                       remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(batch.id)
        .bind(batch.size_id)
        .bind(&batch.size_name)
        .bind(&batch.varieties)
        .bind(batch.quantity)
        .bind(batch.min_stock)
        .bind(batch.reorder_point)
        .bind(batch.production_date)
        .bind(batch.expiry_date)
        .bind(batch.last_updated)
        .bind(&batch.remarks)
        .execute(&mut *tx)
        .await?;

        insert_movement(&mut tx, opening).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn replace_batch(
        &self,
        batch: &StockBatch,
        actor_id: Option<Uuid>,
        remarks: &str,
    ) -> AppResult<Option<(StockBatch, Option<StockMovement>)>> {
        let mut tx = self.pool.begin().await?;

        let Some(stored) = lock_batch(&mut tx, batch.id).await? else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE stock_batches
            SET size_id = $2, size_name = $3, varieties = $4, quantity = $5, min_stock = $6,
                reorder_point = $7, production_date = $8, expiry_date = $9, last_updated = $10,
                remarks = $11
            WHERE id = $1
            "#,
        )
        .bind(batch.id)
        .bind(batch.size_id)
        .bind(&batch.size_name)
        .bind(&batch.varieties)
        .bind(batch.quantity)
        .bind(batch.min_stock)
        .bind(batch.reorder_point)
        .bind(batch.production_date)
        .bind(batch.expiry_date)
        .bind(batch.last_updated)
        .bind(&batch.remarks)
        .execute(&mut *tx)
        .await?;

        let movement = if stored.quantity != batch.quantity {
            let movement = StockMovement::record(
                batch,
                MovementType::Adjustment,
                stored.quantity,
                batch.quantity,
                actor_id,
                remarks,
                batch.last_updated,
            );
            insert_movement(&mut tx, &movement).await?;
            Some(movement)
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some((batch.clone(), movement)))
    }

    async fn adjust_batch(
        &self,
        id: Uuid,
        delta: i32,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<(StockBatch, StockMovement)>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut batch) = lock_batch(&mut tx, id).await? else {
            return Ok(None);
        };
        let previous = batch.quantity;
        // Rejection drops the transaction, rolling back the row lock
        let current = apply_delta(previous, delta)?;

        sqlx::query("UPDATE stock_batches SET quantity = $2, last_updated = $3 WHERE id = $1")
            .bind(id)
            .bind(current)
            .bind(at)
            .execute(&mut *tx)
            .await?;
        batch.quantity = current;
        batch.last_updated = at;

        let movement = StockMovement::record(
            &batch,
            MovementType::for_delta(delta),
            previous,
            current,
            actor_id,
            remarks,
            at,
        );
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;
        Ok(Some((batch, movement)))
    }

    async fn remove_batch(
        &self,
        id: Uuid,
        actor_id: Option<Uuid>,
        remarks: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Option<StockMovement>> {
        let mut tx = self.pool.begin().await?;

        let Some(batch) = lock_batch(&mut tx, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM stock_batches WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE stock_movements SET is_deleted = TRUE WHERE stock_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut deleted = StockMovement::record(
            &batch,
            MovementType::Deleted,
            batch.quantity,
            0,
            actor_id,
            remarks,
            at,
        );
        deleted.is_deleted = true;
        insert_movement(&mut tx, &deleted).await?;

        tx.commit().await?;
        Ok(Some(deleted))
    }

    async fn list_movements(
        &self,
        stock_id: Option<Uuid>,
        include_deleted: bool,
        limit: u32,
    ) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {} FROM stock_movements
            WHERE ($1::uuid IS NULL OR stock_id = $1)
              AND ($2 OR NOT is_deleted)
            ORDER BY timestamp DESC, seq DESC
            LIMIT $3
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(stock_id)
        .bind(include_deleted)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    async fn movements_since(&self, since: DateTime<Utc>) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {} FROM stock_movements WHERE timestamp >= $1 ORDER BY timestamp, seq",
            MOVEMENT_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }
}
