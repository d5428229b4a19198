use async_trait::async_trait;
use uuid::Uuid;

use shared::models::{Announcement, Promotion};

use super::PgStore;
use crate::error::AppResult;
use crate::repositories::ContentRepository;

const PROMOTION_COLUMNS: &str = "id, title, description, discount_percent, start_date, end_date, \
     image_url, is_active, created_at, updated_at";
const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, publish_date, expiry_date, image_url, \
     is_published, created_at, updated_at";

#[async_trait]
impl ContentRepository for PgStore {
    async fn list_promotions(&self) -> AppResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {} FROM promotions ORDER BY start_date DESC, created_at DESC",
            PROMOTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(promotions)
    }

    async fn get_promotion(&self, id: Uuid) -> AppResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {} FROM promotions WHERE id = $1",
            PROMOTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(promotion)
    }

    async fn insert_promotion(&self, promotion: &Promotion) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO promotions (id, title, description, discount_percent, start_date, end_date,
                                    image_url, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(promotion.id)
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.discount_percent)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(&promotion.image_url)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_promotion(&self, promotion: &Promotion) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE promotions
            SET title = $2, description = $3, discount_percent = $4, start_date = $5, end_date = $6,
                image_url = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(promotion.id)
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.discount_percent)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(&promotion.image_url)
        .bind(promotion.is_active)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_promotion(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_announcements(&self) -> AppResult<Vec<Announcement>> {
        let announcements = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {} FROM announcements ORDER BY publish_date DESC, created_at DESC",
            ANNOUNCEMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(announcements)
    }

    async fn get_announcement(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {} FROM announcements WHERE id = $1",
            ANNOUNCEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(announcement)
    }

    async fn insert_announcement(&self, announcement: &Announcement) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO announcements (id, title, content, publish_date, expiry_date, image_url,
                                       is_published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.publish_date)
        .bind(announcement.expiry_date)
        .bind(&announcement.image_url)
        .bind(announcement.is_published)
        .bind(announcement.created_at)
        .bind(announcement.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_announcement(&self, announcement: &Announcement) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = $2, content = $3, publish_date = $4, expiry_date = $5, image_url = $6,
                is_published = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(announcement.id)
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.publish_date)
        .bind(announcement.expiry_date)
        .bind(&announcement.image_url)
        .bind(announcement.is_published)
        .bind(announcement.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_announcement(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
