//! Variety selection for the stock entry form
//!
//! Picking a size resets the chosen varieties. Pinned sizes auto-select
//! their single variety; other sizes toggle varieties up to the size's
//! maximum. Rejected picks produce a warning for the operator, never an
//! error.

use serde::Serialize;
use thiserror::Error;

use crate::models::Size;
use crate::validation::{is_pinned_size, PINNED_VARIETY};

/// Why a toggle was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionWarning {
    #[error("Select a size first")]
    NoSizeSelected,

    #[error("{size} allows at most {max} varieties")]
    LimitReached { size: String, max: usize },

    #[error("{size} only comes in Bibingka")]
    Pinned { size: String },

    #[error("{variety} is not available for {size}")]
    NotAllowed { size: String, variety: String },
}

#[derive(Debug, Clone)]
struct SizeRule {
    name: String,
    max: usize,
    allowed: Vec<String>,
}

/// Form-side state of the variety picker
#[derive(Debug, Clone, Default)]
pub struct VarietySelection {
    size: Option<SizeRule>,
    selected: Vec<String>,
}

impl VarietySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_size(&mut self, size: &Size) {
        self.select_size_rule(&size.name, size.max_varieties, &size.allowed_varieties);
    }

    /// Switch to a size by its rule fields, discarding previous picks
    pub fn select_size_rule(&mut self, name: &str, max_varieties: i32, allowed: &[String]) {
        self.selected.clear();
        self.size = Some(SizeRule {
            name: name.to_string(),
            max: max_varieties.max(0) as usize,
            allowed: allowed.to_vec(),
        });
        if is_pinned_size(name) {
            self.selected.push(PINNED_VARIETY.to_string());
        }
    }

    /// Add the variety if absent, remove it if present
    pub fn toggle(&mut self, variety: &str) -> Result<(), SelectionWarning> {
        let rule = self.size.as_ref().ok_or(SelectionWarning::NoSizeSelected)?;

        if is_pinned_size(&rule.name) {
            return if variety.trim().eq_ignore_ascii_case(PINNED_VARIETY) {
                Ok(())
            } else {
                Err(SelectionWarning::Pinned {
                    size: rule.name.clone(),
                })
            };
        }

        if let Some(pos) = self.selected.iter().position(|v| v == variety) {
            self.selected.remove(pos);
            return Ok(());
        }

        if !rule.allowed.is_empty() && !rule.allowed.iter().any(|v| v == variety) {
            return Err(SelectionWarning::NotAllowed {
                size: rule.name.clone(),
                variety: variety.to_string(),
            });
        }

        if self.selected.len() >= rule.max {
            return Err(SelectionWarning::LimitReached {
                size: rule.name.clone(),
                max: rule.max,
            });
        }

        self.selected.push(variety.to_string());
        Ok(())
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn size_name(&self) -> Option<&str> {
        self.size.as_ref().map(|s| s.name.as_str())
    }

    /// How many more varieties may be added
    pub fn remaining(&self) -> usize {
        self.size
            .as_ref()
            .map_or(0, |s| s.max.saturating_sub(self.selected.len()))
    }

    /// Ready to submit
    pub fn is_complete(&self) -> bool {
        self.size.is_some() && !self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_requires_size() {
        let mut sel = VarietySelection::new();
        assert_eq!(sel.toggle("Ube"), Err(SelectionWarning::NoSizeSelected));
        assert!(!sel.is_complete());
    }

    #[test]
    fn test_pinned_size_auto_selects() {
        let mut sel = VarietySelection::new();
        sel.select_size_rule("Solo", 1, &[]);
        assert_eq!(sel.selected(), ["Bibingka".to_string()]);
        assert!(sel.is_complete());
        assert!(matches!(sel.toggle("Ube"), Err(SelectionWarning::Pinned { .. })));
        assert_eq!(sel.toggle("Bibingka"), Ok(()));
        assert_eq!(sel.selected().len(), 1);
    }

    #[test]
    fn test_limit_is_a_warning() {
        let mut sel = VarietySelection::new();
        sel.select_size_rule("Medium Bilao", 2, &[]);
        sel.toggle("Ube").unwrap();
        sel.toggle("Cassava").unwrap();
        assert_eq!(sel.remaining(), 0);
        let warning = sel.toggle("Mango").unwrap_err();
        assert_eq!(warning.to_string(), "Medium Bilao allows at most 2 varieties");
        assert_eq!(sel.selected().len(), 2);

        // Deselecting frees a slot
        sel.toggle("Ube").unwrap();
        sel.toggle("Mango").unwrap();
        assert_eq!(sel.selected(), ["Cassava".to_string(), "Mango".to_string()]);
    }

    #[test]
    fn test_switching_size_resets() {
        let mut sel = VarietySelection::new();
        sel.select_size_rule("Big Bilao", 4, &[]);
        sel.toggle("Ube").unwrap();
        sel.select_size_rule("Tray", 3, &["Cassava".to_string()]);
        assert!(sel.selected().is_empty());
        assert!(matches!(sel.toggle("Ube"), Err(SelectionWarning::NotAllowed { .. })));
        sel.toggle("Cassava").unwrap();
        assert_eq!(sel.size_name(), Some("Tray"));
    }
}
