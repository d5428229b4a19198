//! Validation rules for the Bakery Admin platform
//!
//! Stock-entry rules are enforced both in the browser (via WASM) and on the
//! server before anything reaches the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Size;

/// Sizes whose variety set is fixed to [`PINNED_VARIETY`]
pub const PINNED_SIZES: &[&str] = &["Solo", "Small"];

/// The only variety sold in pinned sizes
pub const PINNED_VARIETY: &str = "Bibingka";

/// Days before expiry at which a batch is flagged as expiring soon
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Violations of the stock-entry rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockRuleError {
    #[error("Select at least one variety")]
    NoVariety,

    #[error("{size} allows at most {max} varieties")]
    TooManyVarieties { size: String, max: i32 },

    #[error("{size} only comes in Bibingka")]
    PinnedVariety { size: String },

    #[error("{variety} is not available for {size}")]
    VarietyNotAllowed { size: String, variety: String },

    #[error("{0} is selected more than once")]
    DuplicateVariety(String),

    #[error("Expiry date must be after the production date")]
    ExpiryBeforeProduction,

    #[error("Expiry date {expiry} is today or already past; confirm to save anyway")]
    ExpiryConfirmationRequired { expiry: NaiveDate },

    #[error("Stock cannot go below zero (on hand {current}, change {delta})")]
    NegativeStock { current: i32, delta: i32 },

    #[error("Adjustment must change the quantity")]
    ZeroAdjustment,
}

impl StockRuleError {
    /// Input field the violation refers to
    pub fn field(&self) -> &'static str {
        match self {
            StockRuleError::NoVariety
            | StockRuleError::TooManyVarieties { .. }
            | StockRuleError::PinnedVariety { .. }
            | StockRuleError::VarietyNotAllowed { .. }
            | StockRuleError::DuplicateVariety(_) => "varieties",
            StockRuleError::ExpiryBeforeProduction
            | StockRuleError::ExpiryConfirmationRequired { .. } => "expiry_date",
            StockRuleError::NegativeStock { .. } | StockRuleError::ZeroAdjustment => "delta",
        }
    }
}

// ============================================================================
// Stock Entry Rules
// ============================================================================

/// Whether the size's variety set is pinned to [`PINNED_VARIETY`]
pub fn is_pinned_size(size_name: &str) -> bool {
    let name = size_name.trim();
    PINNED_SIZES.iter().any(|p| p.eq_ignore_ascii_case(name))
}

/// Check a submitted variety list against the size's rules and return the
/// list to persist
pub fn normalize_varieties(size: &Size, varieties: &[String]) -> Result<Vec<String>, StockRuleError> {
    check_varieties(&size.name, size.max_varieties, &size.allowed_varieties, varieties)
}

/// Same as [`normalize_varieties`] for callers holding only the size's fields
pub fn check_varieties(
    size_name: &str,
    max_varieties: i32,
    allowed: &[String],
    varieties: &[String],
) -> Result<Vec<String>, StockRuleError> {
    let chosen: Vec<String> = varieties
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if is_pinned_size(size_name) {
        let only_pinned = chosen.iter().all(|v| v.eq_ignore_ascii_case(PINNED_VARIETY));
        return if only_pinned && chosen.len() <= 1 {
            Ok(vec![PINNED_VARIETY.to_string()])
        } else {
            Err(StockRuleError::PinnedVariety {
                size: size_name.to_string(),
            })
        };
    }

    if chosen.is_empty() {
        return Err(StockRuleError::NoVariety);
    }

    for (i, variety) in chosen.iter().enumerate() {
        if chosen[..i].contains(variety) {
            return Err(StockRuleError::DuplicateVariety(variety.clone()));
        }
    }

    if chosen.len() > max_varieties.max(0) as usize {
        return Err(StockRuleError::TooManyVarieties {
            size: size_name.to_string(),
            max: max_varieties,
        });
    }

    if !allowed.is_empty() {
        if let Some(variety) = chosen.iter().find(|v| !allowed.contains(v)) {
            return Err(StockRuleError::VarietyNotAllowed {
                size: size_name.to_string(),
                variety: variety.clone(),
            });
        }
    }

    Ok(chosen)
}

/// Validate production/expiry dates.
///
/// Returns a non-blocking warning when the batch expires within
/// `warning_days`. Expiry on or before `today` is only accepted with
/// `confirmed` set.
pub fn check_expiry(
    production_date: NaiveDate,
    expiry_date: NaiveDate,
    today: NaiveDate,
    confirmed: bool,
    warning_days: i64,
) -> Result<Option<String>, StockRuleError> {
    if expiry_date <= production_date {
        return Err(StockRuleError::ExpiryBeforeProduction);
    }

    let days_left = (expiry_date - today).num_days();
    if days_left <= 0 {
        if !confirmed {
            return Err(StockRuleError::ExpiryConfirmationRequired {
                expiry: expiry_date,
            });
        }
        return Ok(Some(format!("Batch saved with expiry date {} already reached", expiry_date)));
    }

    if days_left <= warning_days {
        return Ok(Some(format!(
            "Batch expires in {} day{}",
            days_left,
            if days_left == 1 { "" } else { "s" }
        )));
    }

    Ok(None)
}

/// Resulting quantity after a signed adjustment; never negative
pub fn apply_delta(current: i32, delta: i32) -> Result<i32, StockRuleError> {
    if delta == 0 {
        return Err(StockRuleError::ZeroAdjustment);
    }
    match current.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        _ => Err(StockRuleError::NegativeStock { current, delta }),
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a price or amount is not negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate a discount percentage is between 0 and 100
pub fn validate_discount_percent(percent: Decimal) -> Result<(), &'static str> {
    if percent < Decimal::ZERO || percent > Decimal::from(100) {
        return Err("Discount must be between 0 and 100 percent");
    }
    Ok(())
}

/// Validate a scheduling window ends on or after it starts
pub fn validate_date_window(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if end < start {
        return Err("End date cannot be before the start date");
    }
    Ok(())
}
