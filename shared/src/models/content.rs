//! Scheduled content: promotions and announcements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and scheduled to run on `today`
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.is_active && today >= self.start_date && today <= self.end_date
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PromotionInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub publish_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Published and inside its display window on `today`
    pub fn is_visible(&self, today: NaiveDate) -> bool {
        self.is_published
            && today >= self.publish_date
            && self.expiry_date.map_or(true, |end| today <= end)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnnouncementInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub publish_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, d).unwrap()
    }

    #[test]
    fn test_promotion_window() {
        let promo = Promotion {
            id: Uuid::new_v4(),
            title: "Holiday Bibingka".into(),
            description: None,
            discount_percent: Some(Decimal::from(10)),
            start_date: date(20),
            end_date: date(26),
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(promo.is_running(date(20)));
        assert!(promo.is_running(date(26)));
        assert!(!promo.is_running(date(27)));

        let paused = Promotion { is_active: false, ..promo };
        assert!(!paused.is_running(date(22)));
    }

    #[test]
    fn test_announcement_without_expiry_stays_visible() {
        let post = Announcement {
            id: Uuid::new_v4(),
            title: "Open on Sundays".into(),
            content: "We now open every Sunday".into(),
            publish_date: date(1),
            expiry_date: None,
            image_url: None,
            is_published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!post.is_visible(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()));
        assert!(post.is_visible(date(31)));
    }
}
