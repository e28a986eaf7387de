//! Product Model

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::category::normalize_category;

/// Number of hex digits in the wire form of a [`ProductId`]
pub const PRODUCT_ID_LEN: usize = 24;

/// Largest value representable in 24 hex digits (96 bits)
const PRODUCT_ID_MAX: u128 = (1u128 << 96) - 1;

/// Product identity
///
/// Assigned by the store from a monotonically increasing sequence, so the
/// numeric order of ids is creation order. On the wire an id is exactly 24
/// hex digits (`^[0-9a-fA-F]{24}$`), zero padded and lower-case on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(u128);

impl ProductId {
    /// Build an id from its sequence value
    ///
    /// Values above 96 bits are clamped, they cannot be written in 24 digits.
    pub const fn from_sequence(seq: u128) -> Self {
        if seq > PRODUCT_ID_MAX {
            Self(PRODUCT_ID_MAX)
        } else {
            Self(seq)
        }
    }

    /// Raw numeric value (store key)
    pub const fn value(&self) -> u128 {
        self.0
    }
}

/// Malformed product id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("product id must be {PRODUCT_ID_LEN} hex characters, got {0:?}")]
pub struct ParseProductIdError(pub String);

impl FromStr for ProductId {
    type Err = ParseProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != PRODUCT_ID_LEN || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseProductIdError(s.to_string()));
        }
        u128::from_str_radix(trimmed, 16)
            .map(Self)
            .map_err(|_| ParseProductIdError(s.to_string()))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:024x}", self.0)
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Canonical uppercase category name
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub brand: String,
}

impl Product {
    /// Attach an identity to stored content
    pub fn with_content(id: ProductId, content: ProductCreate) -> Self {
        Self {
            id,
            name: content.name,
            category: content.category,
            price: content.price,
            stock: content.stock,
            brand: content.brand,
        }
    }

    /// Content of this product without its identity
    pub fn content(&self) -> ProductCreate {
        ProductCreate {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            stock: self.stock,
            brand: self.brand.clone(),
        }
    }
}

/// Create product payload
///
/// Also used as the identity-less content of a product when writing to the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub brand: String,
}

impl ProductCreate {
    /// Trim text fields, canonicalize the category and uppercase the brand
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            category: normalize_category(&self.category),
            price: self.price,
            stock: self.stock,
            brand: self.brand.trim().to_uppercase(),
        }
    }
}

/// Update product payload (absent fields keep their current value)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub brand: Option<String>,
}

impl ProductUpdate {
    /// Merge this patch onto the current record, producing normalized content
    pub fn merge_onto(&self, current: &Product) -> ProductCreate {
        ProductCreate {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| current.category.clone()),
            price: self.price.unwrap_or(current.price),
            stock: self.stock.unwrap_or(current.stock),
            brand: self.brand.clone().unwrap_or_else(|| current.brand.clone()),
        }
        .normalized()
    }

    /// Whether the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.brand.is_none()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Cursor scan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query of the offset-paginated listing (`?page&limit&search`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive name substring
    pub search: Option<String>,
}

/// Query of the cursor-paginated category listing
/// (`?name&limit&direction&reference`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub name: Option<String>,
    pub limit: Option<u64>,
    pub direction: Option<Direction>,
    /// Cursor: id of the first (previous) or last (next) product of the current page
    pub reference: Option<String>,
}

/// Offset-paginated product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub total: u64,
    pub pages: u64,
}

/// Cursor-paginated listing of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPage {
    pub products: Vec<Product>,
    pub next: Option<ProductId>,
    pub previous: Option<ProductId>,
}
