//! Promotions and announcements

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use shared::models::{Announcement, AnnouncementInput, Promotion, PromotionInput};
use shared::validation::{validate_date_window, validate_discount_percent};

use super::MediaService;
use crate::error::{AppError, AppResult};
use crate::external::ImageStore;
use crate::repositories::{ContentRepository, Stores};

#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    media: MediaService,
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_promotion(input: &PromotionInput) -> AppResult<()> {
    input.validate()?;
    if let Some(percent) = input.discount_percent {
        validate_discount_percent(percent).map_err(|m| AppError::validation("discount_percent", m))?;
    }
    validate_date_window(input.start_date, input.end_date)
        .map_err(|m| AppError::validation("end_date", m))
}

fn check_announcement(input: &AnnouncementInput) -> AppResult<()> {
    input.validate()?;
    match input.expiry_date {
        Some(expiry) => validate_date_window(input.publish_date, expiry)
            .map_err(|m| AppError::validation("expiry_date", m)),
        None => Ok(()),
    }
}

impl ContentService {
    pub fn new(stores: &Stores, images: Arc<dyn ImageStore>) -> Self {
        Self {
            content: stores.content.clone(),
            media: MediaService::new(images),
        }
    }

    // ========================================================================
    // Promotions
    // ========================================================================

    pub async fn list_promotions(&self) -> AppResult<Vec<Promotion>> {
        self.content.list_promotions().await
    }

    pub async fn get_promotion(&self, id: Uuid) -> AppResult<Promotion> {
        self.content
            .get_promotion(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Promotion".to_string()))
    }

    pub async fn create_promotion(&self, input: PromotionInput) -> AppResult<Promotion> {
        check_promotion(&input)?;

        let now = Utc::now();
        let promotion = Promotion {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: clean_optional(input.description),
            discount_percent: input.discount_percent,
            start_date: input.start_date,
            end_date: input.end_date,
            image_url: clean_optional(input.image_url),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        self.content.insert_promotion(&promotion).await?;

        tracing::info!("Created promotion {}", promotion.title);
        Ok(promotion)
    }

    pub async fn update_promotion(&self, id: Uuid, input: PromotionInput) -> AppResult<Promotion> {
        check_promotion(&input)?;
        let existing = self.get_promotion(id).await?;
        let previous_image = existing.image_url.clone();

        let promotion = Promotion {
            title: input.title.trim().to_string(),
            description: clean_optional(input.description),
            discount_percent: input.discount_percent,
            start_date: input.start_date,
            end_date: input.end_date,
            image_url: clean_optional(input.image_url),
            is_active: input.is_active,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.content.update_promotion(&promotion).await? {
            return Err(AppError::NotFound("Promotion".to_string()));
        }

        self.media
            .discard_replaced(previous_image.as_deref(), promotion.image_url.as_deref())
            .await;
        tracing::info!("Updated promotion {}", promotion.title);
        Ok(promotion)
    }

    pub async fn delete_promotion(&self, id: Uuid) -> AppResult<()> {
        let promotion = self.get_promotion(id).await?;
        if !self.content.delete_promotion(id).await? {
            return Err(AppError::NotFound("Promotion".to_string()));
        }

        self.media.discard(promotion.image_url.as_deref()).await;
        tracing::info!("Deleted promotion {}", promotion.title);
        Ok(())
    }

    // ========================================================================
    // Announcements
    // ========================================================================

    pub async fn list_announcements(&self) -> AppResult<Vec<Announcement>> {
        self.content.list_announcements().await
    }

    pub async fn get_announcement(&self, id: Uuid) -> AppResult<Announcement> {
        self.content
            .get_announcement(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement".to_string()))
    }

    pub async fn create_announcement(&self, input: AnnouncementInput) -> AppResult<Announcement> {
        check_announcement(&input)?;

        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            content: input.content,
            publish_date: input.publish_date,
            expiry_date: input.expiry_date,
            image_url: clean_optional(input.image_url),
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        };
        self.content.insert_announcement(&announcement).await?;

        tracing::info!("Created announcement {}", announcement.title);
        Ok(announcement)
    }

    pub async fn update_announcement(
        &self,
        id: Uuid,
        input: AnnouncementInput,
    ) -> AppResult<Announcement> {
        check_announcement(&input)?;
        let existing = self.get_announcement(id).await?;
        let previous_image = existing.image_url.clone();

        let announcement = Announcement {
            title: input.title.trim().to_string(),
            content: input.content,
            publish_date: input.publish_date,
            expiry_date: input.expiry_date,
            image_url: clean_optional(input.image_url),
            is_published: input.is_published,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.content.update_announcement(&announcement).await? {
            return Err(AppError::NotFound("Announcement".to_string()));
        }

        self.media
            .discard_replaced(previous_image.as_deref(), announcement.image_url.as_deref())
            .await;
        tracing::info!("Updated announcement {}", announcement.title);
        Ok(announcement)
    }

    pub async fn delete_announcement(&self, id: Uuid) -> AppResult<()> {
        let announcement = self.get_announcement(id).await?;
        if !self.content.delete_announcement(id).await? {
            return Err(AppError::NotFound("Announcement".to_string()));
        }

        self.media.discard(announcement.image_url.as_deref()).await;
        tracing::info!("Deleted announcement {}", announcement.title);
        Ok(())
    }
}
