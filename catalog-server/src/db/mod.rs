//! Database Module
//!
//! 事务型记录存储: 商品 / 分类计数 / 统计聚合
//!
//! 服务层只依赖 [`RecordStore`] / [`StoreRead`] / [`StoreWrite`] 三个 trait,
//! 默认实现为 [`storage::RedbStore`] (嵌入式 redb)。
//!
//! # 事务约定
//!
//! - 读操作在一个只读事务内完成 (一致快照)
//! - 写操作必须以 [`StoreWrite::commit`] 或 [`StoreWrite::abort`] 结束
//! - 事务对象不跨越 `.await` 持有

pub mod storage;

pub use storage::RedbStore;

use shared::error::AppError;
use shared::models::{CategoryCounter, Product, ProductCreate, ProductId, ReportAggregate};
use thiserror::Error;

use crate::catalog::{ReportDelta, ScanPlan};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sequence exhausted: {0}")]
    SequenceExhausted(&'static str),

    #[error("Aggregate overflow: {0}")]
    AggregateOverflow(&'static str),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::database(err.to_string())
    }
}

/// Name filter of the product listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn by_name(search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Self { search }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match &self.search {
            Some(needle) => product.name.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

/// Read access inside one transaction
pub trait StoreRead {
    fn get_product(&self, id: ProductId) -> StorageResult<Option<Product>>;

    /// Matching products in ascending identity order
    fn find_products(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> StorageResult<Vec<Product>>;

    fn count_products(&self, filter: &ProductFilter) -> StorageResult<u64>;

    /// Rows of one category in scan order (descending for reverse plans)
    fn scan_category(&self, plan: &ScanPlan) -> StorageResult<Vec<Product>>;

    fn get_report(&self, name: &str) -> StorageResult<Option<ReportAggregate>>;

    fn get_category_counter(&self, name: &str) -> StorageResult<Option<CategoryCounter>>;

    /// Highest counters first, ties by name
    fn top_categories(&self, n: usize) -> StorageResult<Vec<CategoryCounter>>;
}

/// Write access inside one transaction
///
/// Nothing is visible to other transactions before [`StoreWrite::commit`].
pub trait StoreWrite: StoreRead {
    /// Insert a product and its category index entry, returning the new id
    fn insert_product(&mut self, content: &ProductCreate) -> StorageResult<ProductId>;

    /// Compare-and-set replace
    ///
    /// Writes `content` only if the stored record still equals `expected`.
    /// Returns the number of modified records (0 or 1).
    fn replace_product(&mut self, expected: &Product, content: &ProductCreate)
    -> StorageResult<u64>;

    /// Remove a product, returning what was removed
    fn delete_product(&mut self, id: ProductId) -> StorageResult<Option<Product>>;

    /// Upsert a category counter by a signed delta (floored at zero)
    fn increment_category(&mut self, name: &str, delta: i64) -> StorageResult<()>;

    /// Upsert a report aggregate by a signed delta
    fn increment_report(&mut self, name: &str, delta: &ReportDelta) -> StorageResult<()>;

    fn commit(self: Box<Self>) -> StorageResult<()>;

    fn abort(self: Box<Self>) -> StorageResult<()>;
}

/// Transactional record store
pub trait RecordStore: Send + Sync {
    fn begin_read(&self) -> StorageResult<Box<dyn StoreRead + '_>>;

    fn begin_write(&self) -> StorageResult<Box<dyn StoreWrite + '_>>;
}
