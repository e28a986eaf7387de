//! Catalog Service - product writes with aggregate maintenance and a read-through cache
//!
//! # 写路径
//!
//! ```text
//! validate → write txn { product write + AggregateDelta } → commit → cache invalidation
//! ```
//!
//! 事务在任何缓存 `.await` 之前结束 (commit 或 abort)。
//!
//! # 读路径
//!
//! ```text
//! validate → cache get → (miss) read txn → cache set → response
//! ```
//!
//! 缓存故障只记录日志, 读操作回退到存储。

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CategoryPage, CategoryQuery, Direction, Product, ProductCreate, ProductId, ProductListQuery,
    ProductPage, ProductUpdate, normalize_category,
};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, category_page_key, product_key, product_page_key};
use crate::catalog::pagination::{offset, offset_links};
use crate::catalog::{AggregateDelta, ScanPlan};
use crate::db::{ProductFilter, RecordStore, StoreRead, StoreWrite};
use crate::utils::validation::{
    MAX_SHORT_TEXT_LEN, parse_product_id, require_limit, require_positive,
    validate_product_create, validate_product_update, validate_required_text,
};

/// Conditional update attempts before giving up
pub const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Result of the update protocol inside one transaction
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Patch matched the stored content, nothing written
    Unchanged(Product),
    Updated(Product),
}

/// Apply a partial update with optimistic retry
///
/// Every attempt re-reads the current record, merges the patch and derives
/// the aggregate deltas from what it just read, then issues a compare-and-set
/// replace. A replace that modifies nothing is retried.
pub fn apply_update<W: StoreWrite + ?Sized>(
    txn: &mut W,
    id: ProductId,
    patch: &ProductUpdate,
) -> AppResult<UpdateOutcome> {
    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let current = txn
            .get_product(id)?
            .ok_or_else(|| AppError::product_not_found(id))?;

        let merged = patch.merge_onto(&current);
        if merged == current.content() {
            return Ok(UpdateOutcome::Unchanged(current));
        }

        if txn.replace_product(&current, &merged)? == 0 {
            tracing::warn!(product_id = %id, attempt, "Conditional update modified nothing, retrying");
            continue;
        }

        AggregateDelta::on_update(&current, &merged).apply(txn)?;

        let updated = txn.get_product(id)?.ok_or_else(|| {
            AppError::internal(format!("product {id} missing after update"))
        })?;
        return Ok(UpdateOutcome::Updated(updated));
    }

    Err(AppError::update_conflict(MAX_UPDATE_ATTEMPTS).with_detail("id", id.to_string()))
}

// =============================================================================
// CatalogService
// =============================================================================

/// Product catalog over a transactional store and a TTL cache
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn Cache>,
    /// TTL of single-product entries
    entity_ttl: Duration,
    /// TTL of list pages
    list_ttl: Duration,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cache", &self.cache.backend_name())
            .field("entity_ttl", &self.entity_ttl)
            .field("list_ttl", &self.list_ttl)
            .finish()
    }
}

impl CatalogService {
    /// Create a new CatalogService
    ///
    /// List pages are cached for a third of `ttl`.
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            entity_ttl: ttl,
            list_ttl: ttl / 3,
        }
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Run `f` in a read-only snapshot
    fn run_read<'s, T>(
        &'s self,
        f: impl FnOnce(&(dyn StoreRead + 's)) -> AppResult<T>,
    ) -> AppResult<T> {
        let txn = self.store.begin_read()?;
        f(txn.as_ref())
    }

    /// Run `f` in a write transaction: commit on `Ok`, abort on `Err`
    fn run_write<'s, T>(
        &'s self,
        operation: &'static str,
        f: impl FnOnce(&mut (dyn StoreWrite + 's)) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut txn = self.store.begin_write()?;
        match f(txn.as_mut()) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                if err.kind().is_server() {
                    tracing::error!(operation, error = %err, "Transaction aborted");
                } else {
                    tracing::debug!(operation, error = %err, "Transaction aborted");
                }
                if let Err(abort_err) = txn.abort() {
                    tracing::error!(operation, error = %abort_err, "Failed to abort transaction");
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Cache (failures degrade to the store)
    // =========================================================================

    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(hit) => {
                    tracing::debug!(key, "Cache hit");
                    Some(hit)
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn cache_set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, json, ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::error!(key, error = %e, "Cache delete failed, entry may be stale until TTL");
        }
    }

    async fn cache_flush(&self) {
        if let Err(e) = self.cache.flush_all().await {
            tracing::error!(error = %e, "Cache flush failed, entries may be stale until TTL");
        }
    }

    // =========================================================================
    // Product CRUD
    // =========================================================================

    /// Create a product and fold it into the aggregates
    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        validate_product_create(&data)?;
        let content = data.normalized();

        let product = self.run_write("create_product", |txn| {
            let id = txn.insert_product(&content)?;
            AggregateDelta::on_create(&content).apply(txn)?;
            txn.get_product(id)?
                .ok_or_else(|| AppError::internal(format!("product {id} missing after insert")))
        })?;

        self.cache_flush().await;
        self.cache_set(&product_key(product.id), &product, self.entity_ttl)
            .await;

        tracing::info!(product_id = %product.id, category = %product.category, "Product created");
        Ok(product)
    }

    /// Fetch one product by its 24-hex-digit id
    pub async fn get_product(&self, raw_id: &str) -> AppResult<Product> {
        let id = parse_product_id(raw_id)?;
        let key = product_key(id);

        if let Some(product) = self.cache_get::<Product>(&key).await {
            return Ok(product);
        }

        let product = self
            .run_read(|txn| Ok(txn.get_product(id)?))?
            .ok_or_else(|| AppError::product_not_found(id))?;

        self.cache_set(&key, &product, self.entity_ttl).await;
        Ok(product)
    }

    /// Offset-paginated listing with optional name search
    pub async fn get_products(&self, query: ProductListQuery) -> AppResult<ProductPage> {
        let page = require_positive(query.page, "page")?;
        let limit = require_limit(query.limit)?;
        let filter = ProductFilter::by_name(query.search.as_deref());
        let key = product_page_key(page, limit, filter.search.as_deref());

        if let Some(cached) = self.cache_get::<ProductPage>(&key).await {
            return Ok(cached);
        }

        let (products, total) = self.run_read(|txn| {
            let products = txn.find_products(&filter, offset(page, limit), limit)?;
            let total = txn.count_products(&filter)?;
            Ok((products, total))
        })?;

        let links = offset_links(page, limit, total, products.len());
        let result = ProductPage {
            products,
            next: links.next,
            previous: links.previous,
            total,
            pages: links.pages,
        };

        self.cache_set(&key, &result, self.list_ttl).await;
        Ok(result)
    }

    /// Cursor-paginated listing of one category
    ///
    /// A `reference` requires a `direction`; a `direction` alone reads the
    /// first page. An empty page is a not-found error.
    pub async fn get_products_by_category(&self, query: CategoryQuery) -> AppResult<CategoryPage> {
        let name = query.name.unwrap_or_default();
        validate_required_text(&name, "name", MAX_SHORT_TEXT_LEN)?;
        let category = normalize_category(&name);
        let limit = require_limit(query.limit)?;

        let cursor: Option<(Direction, ProductId)> = match (query.direction, query.reference) {
            (Some(direction), Some(reference)) => Some((direction, parse_product_id(&reference)?)),
            (None, Some(_)) => {
                return Err(AppError::invalid_pagination(
                    "direction is required when reference is given",
                )
                .with_detail("field", "direction"));
            }
            (_, None) => None,
        };

        let key = category_page_key(&category, limit, cursor);
        if let Some(cached) = self.cache_get::<CategoryPage>(&key).await {
            return Ok(cached);
        }

        let plan = ScanPlan::new(category.as_str(), cursor, limit as usize);
        let page = self.run_read(|txn| Ok(plan.build_page(txn.scan_category(&plan)?)))?;

        if page.products.is_empty() {
            return Err(AppError::new(ErrorCode::CategoryProductsNotFound)
                .with_detail("category", category));
        }

        self.cache_set(&key, &page, self.list_ttl).await;
        Ok(page)
    }

    /// Partially update a product
    ///
    /// A patch that changes nothing returns the current record without a
    /// write or a cache invalidation.
    pub async fn update_product(&self, raw_id: &str, patch: ProductUpdate) -> AppResult<Product> {
        let id = parse_product_id(raw_id)?;
        validate_product_update(&patch)?;

        let outcome = self.run_write("update_product", |txn| apply_update(txn, id, &patch))?;

        match outcome {
            UpdateOutcome::Unchanged(product) => {
                tracing::debug!(product_id = %id, "Update is a no-op");
                Ok(product)
            }
            UpdateOutcome::Updated(product) => {
                self.cache_flush().await;
                self.cache_set(&product_key(id), &product, self.entity_ttl)
                    .await;
                tracing::info!(product_id = %id, "Product updated");
                Ok(product)
            }
        }
    }

    /// Delete a product and remove it from the aggregates
    pub async fn delete_product(&self, raw_id: &str) -> AppResult<()> {
        let id = parse_product_id(raw_id)?;

        let removed = self.run_write("delete_product", |txn| {
            let removed = txn
                .delete_product(id)?
                .ok_or_else(|| AppError::product_not_found(id))?;
            AggregateDelta::on_delete(&removed).apply(txn)?;
            Ok(removed)
        })?;

        self.cache_delete(&product_key(id)).await;

        tracing::info!(product_id = %id, category = %removed.category, "Product deleted");
        Ok(())
    }
}
