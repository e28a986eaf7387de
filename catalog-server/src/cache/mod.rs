//! Cache layer
//!
//! Non-authoritative key/value cache in front of the record store.
//!
//! # Keys
//!
//! | Key | Content |
//! |-----|---------|
//! | `product:{id}` | single product |
//! | `products:page:{page}-{limit}[-{search}]` | offset page |
//! | `products:category:{CATEGORY}-{limit}` | first cursor page |
//! | `products:category:{CATEGORY}-{direction}-{limit}-{reference}` | cursor page |
//!
//! # Invalidation
//!
//! - create / update: flush everything
//! - delete: remove the `product:{id}` key only

pub mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{Direction, ProductId};
use std::time::Duration;
use thiserror::Error;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache backend
///
/// Values are JSON documents. Entries expire after their TTL; an expired
/// entry reads as absent.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> CacheResult<()>;

    /// Returns `true` if the key existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    async fn flush_all(&self) -> CacheResult<()>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// Key builders
// =============================================================================

const PRODUCT_PREFIX: &str = "product";
const PRODUCT_PAGE_PREFIX: &str = "products:page";
const CATEGORY_PAGE_PREFIX: &str = "products:category";

/// Single product entry
pub fn product_key(id: ProductId) -> String {
    format!("{PRODUCT_PREFIX}:{id}")
}

/// Offset page of the product listing
pub fn product_page_key(page: u64, limit: u64, search: Option<&str>) -> String {
    match search {
        Some(term) => format!("{PRODUCT_PAGE_PREFIX}:{page}-{limit}-{term}"),
        None => format!("{PRODUCT_PAGE_PREFIX}:{page}-{limit}"),
    }
}

/// Cursor page of one category (category must be canonical)
pub fn category_page_key(category: &str, limit: u64, cursor: Option<(Direction, ProductId)>) -> String {
    match cursor {
        Some((direction, reference)) => {
            format!("{CATEGORY_PAGE_PREFIX}:{category}-{direction}-{limit}-{reference}")
        }
        None => format!("{CATEGORY_PAGE_PREFIX}:{category}-{limit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let id = ProductId::from_sequence(7);
        assert_eq!(product_key(id), "product:000000000000000000000007");
        assert_eq!(product_page_key(2, 10, None), "products:page:2-10");
        assert_eq!(
            product_page_key(1, 5, Some("balon")),
            "products:page:1-5-balon"
        );
        assert_eq!(category_page_key("FUTBOL", 5, None), "products:category:FUTBOL-5");
        assert_eq!(
            category_page_key("FUTBOL", 5, Some((Direction::Previous, id))),
            "products:category:FUTBOL-previous-5-000000000000000000000007"
        );
    }

    #[test]
    fn test_list_keys_never_collide_with_entity_keys() {
        let id = ProductId::from_sequence(1);
        let entity = product_key(id);
        assert!(!product_page_key(1, 10, None).starts_with(&entity));
        assert!(!entity.starts_with(PRODUCT_PAGE_PREFIX));
        assert!(!entity.starts_with(CATEGORY_PAGE_PREFIX));
    }
}
