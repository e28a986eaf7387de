//! Category Model

use serde::{Deserialize, Serialize};

/// Canonical form of a category name (trimmed, uppercase)
///
/// Every path that stores, counts, indexes or looks up a category goes
/// through this function, so `"futbol"` and `" FUTBOL "` are the same
/// category.
pub fn normalize_category(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Per-category product counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounter {
    /// Canonical category name
    pub name: String,
    /// Number of stored products in this category
    pub count: u64,
}

impl CategoryCounter {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}
