//! WebAssembly module for the Bakery Admin panel
//!
//! Provides client-side checks for the stock entry form:
//! - Variety selection per size
//! - Expiry date validation and warnings
//! - Quantity adjustment preview
//! - Stock level classification

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::selection::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("bakery-admin wasm ready"));
}

/// Variety picker bound to one form instance
#[wasm_bindgen]
pub struct VarietyPicker {
    inner: VarietySelection,
}

#[wasm_bindgen]
impl VarietyPicker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> VarietyPicker {
        VarietyPicker {
            inner: VarietySelection::new(),
        }
    }

    /// Switch size; `allowed_json` is a JSON array of variety names (may be empty)
    #[wasm_bindgen(js_name = selectSize)]
    pub fn select_size(&mut self, name: &str, max_varieties: i32, allowed_json: &str) -> Result<(), JsValue> {
        let allowed = parse_names(allowed_json)?;
        self.inner.select_size_rule(name, max_varieties, &allowed);
        Ok(())
    }

    /// Toggle a variety; returns the warning text when the pick is refused
    pub fn toggle(&mut self, variety: &str) -> Option<String> {
        self.inner.toggle(variety).err().map(|w| w.to_string())
    }

    /// Currently selected varieties as a JSON array
    pub fn selected(&self) -> String {
        serde_json::to_string(self.inner.selected()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }
}

impl Default for VarietyPicker {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a submitted variety list for a size; returns the error text or `None`
#[wasm_bindgen(js_name = checkVarieties)]
pub fn check_variety_list(
    size_name: &str,
    max_varieties: i32,
    allowed_json: &str,
    varieties_json: &str,
) -> Result<Option<String>, JsValue> {
    let allowed = parse_names(allowed_json)?;
    let varieties = parse_names(varieties_json)?;
    Ok(check_varieties(size_name, max_varieties, &allowed, &varieties)
        .err()
        .map(|e| e.to_string()))
}

/// Expiry check for ISO dates (YYYY-MM-DD). `warning_days` should come from
/// the server's stock settings; 0 falls back to the default window.
///
/// Returns a JSON object `{ "ok", "needs_confirmation", "message" }`.
#[wasm_bindgen(js_name = checkExpiry)]
pub fn check_expiry_dates(
    production: &str,
    expiry: &str,
    today: &str,
    confirmed: bool,
    warning_days: u32,
) -> Result<String, JsValue> {
    let warning_days = match warning_days {
        0 => EXPIRY_WARNING_DAYS,
        days => i64::from(days),
    };
    let outcome = expiry_outcome(
        parse_date(production)?,
        parse_date(expiry)?,
        parse_date(today)?,
        confirmed,
        warning_days,
    );
    serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Preview of an adjustment; returns the new quantity or -1 when it would be rejected
#[wasm_bindgen(js_name = previewAdjustment)]
pub fn preview_adjustment(current: i32, delta: i32) -> i32 {
    apply_delta(current, delta).unwrap_or(-1)
}

/// Stock level label: out_of_stock, critical, reorder or healthy
#[wasm_bindgen(js_name = stockLevel)]
pub fn stock_level(quantity: i32, min_stock: i32, reorder_point: i32) -> String {
    match StockLevel::classify(quantity, min_stock, reorder_point) {
        StockLevel::OutOfStock => "out_of_stock",
        StockLevel::Critical => "critical",
        StockLevel::Reorder => "reorder",
        StockLevel::Healthy => "healthy",
    }
    .to_string()
}

#[derive(Debug, serde::Serialize, PartialEq)]
struct ExpiryOutcome {
    ok: bool,
    needs_confirmation: bool,
    message: Option<String>,
}

fn expiry_outcome(
    production: NaiveDate,
    expiry: NaiveDate,
    today: NaiveDate,
    confirmed: bool,
    warning_days: i64,
) -> ExpiryOutcome {
    match check_expiry(production, expiry, today, confirmed, warning_days) {
        Ok(warning) => ExpiryOutcome {
            ok: true,
            needs_confirmation: false,
            message: warning,
        },
        Err(e) => ExpiryOutcome {
            ok: false,
            needs_confirmation: matches!(e, StockRuleError::ExpiryConfirmationRequired { .. }),
            message: Some(e.to_string()),
        },
    }
}

fn parse_names(json: &str) -> Result<Vec<String>, JsValue> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid variety list: {}", e)))
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_picker_flow() {
        let mut picker = VarietyPicker::new();
        picker.inner.select_size_rule("Big Bilao", 2, &[]);
        assert_eq!(picker.toggle("Ube"), None);
        assert_eq!(picker.toggle("Cassava"), None);
        assert_eq!(
            picker.toggle("Mango").as_deref(),
            Some("Big Bilao allows at most 2 varieties")
        );
        assert_eq!(picker.selected(), r#"["Ube","Cassava"]"#);
        assert!(picker.is_complete());
    }

    #[test]
    fn test_expiry_outcome() {
        let expired = expiry_outcome(date("2024-06-01"), date("2024-06-05"), date("2024-06-05"), false, 7);
        assert!(!expired.ok);
        assert!(expired.needs_confirmation);

        let backwards = expiry_outcome(date("2024-06-05"), date("2024-06-01"), date("2024-05-01"), false, 7);
        assert!(!backwards.ok);
        assert!(!backwards.needs_confirmation);

        let soon = expiry_outcome(date("2024-06-01"), date("2024-06-08"), date("2024-06-05"), false, 7);
        assert!(soon.ok);
        assert_eq!(soon.message.as_deref(), Some("Batch expires in 3 days"));
    }

    #[test]
    fn test_expiry_window_follows_setting() {
        let narrow = expiry_outcome(date("2024-06-01"), date("2024-06-08"), date("2024-06-05"), false, 2);
        assert!(narrow.ok);
        assert_eq!(narrow.message, None);

        let wide = expiry_outcome(date("2024-06-01"), date("2024-06-20"), date("2024-06-05"), false, 30);
        assert!(wide.message.is_some());

        let json = check_expiry_dates("2024-06-01", "2024-06-08", "2024-06-05", false, 2).unwrap();
        assert!(json.contains(r#""message":null"#));
    }

    #[test]
    fn test_preview_adjustment() {
        assert_eq!(preview_adjustment(10, 5), 15);
        assert_eq!(preview_adjustment(15, -20), -1);
    }

    #[test]
    fn test_stock_level_labels() {
        assert_eq!(stock_level(0, 5, 10), "out_of_stock");
        assert_eq!(stock_level(4, 5, 10), "critical");
        assert_eq!(stock_level(9, 5, 10), "reorder");
        assert_eq!(stock_level(50, 5, 10), "healthy");
    }
}
