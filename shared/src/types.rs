//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An image hosted on the external image service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

/// Query parameters for capped, newest-first listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Resolve the limit against a default, never returning zero
    pub fn limit_or(&self, default: u32) -> u32 {
        match self.limit {
            Some(0) | None => default,
            Some(limit) => limit,
        }
    }
}

/// Inclusive date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every day in the range, oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults() {
        assert_eq!(ListQuery { limit: None }.limit_or(50), 50);
        assert_eq!(ListQuery { limit: Some(0) }.limit_or(50), 50);
        assert_eq!(ListQuery { limit: Some(10) }.limit_or(50), 10);
    }

    #[test]
    fn test_date_range_days() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4); // 2024 is a leap year
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()));
    }
}
