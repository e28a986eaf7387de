//! redb-based record store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` (JSON) | Primary records |
//! | `category_index` | `(category, product_id)` | `()` | Cursor scans per category |
//! | `category_counters` | `category` | `u64` | Products per category |
//! | `reports` | `name` | `ReportAggregate` (JSON) | Running totals |
//! | `sequence_counter` | `"product_id"` | `u64` | Identity sequence |
//!
//! # Transactions
//!
//! redb allows one write transaction at a time and any number of readers on
//! consistent snapshots. Every product mutation updates `products`, the
//! category index, the counters and the report in the same write transaction,
//! so they commit or roll back together.

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use shared::models::{CategoryCounter, Product, ProductCreate, ProductId, ReportAggregate};
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use super::{ProductFilter, RecordStore, StorageError, StorageResult, StoreRead, StoreWrite};
use crate::catalog::{ReportDelta, ScanPlan, ScanStart};

/// Products: key = product id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<u128, &[u8]> = TableDefinition::new("products");

/// Category index: key = (canonical category, product id), value = empty
const CATEGORY_INDEX_TABLE: TableDefinition<(&str, u128), ()> =
    TableDefinition::new("category_index");

/// Category counters: key = canonical category, value = product count
const CATEGORY_COUNTERS_TABLE: TableDefinition<&str, u64> =
    TableDefinition::new("category_counters");

/// Report aggregates: key = aggregate name, value = JSON-serialized ReportAggregate
const REPORTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("reports");

/// Sequence counters: key = sequence name, value = last issued value
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const PRODUCT_SEQUENCE_KEY: &str = "product_id";

/// Record store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: a commit is
    /// persistent once `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::initialize(db)
    }

    /// Open an in-memory database (tests and ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(CATEGORY_INDEX_TABLE)?;
            let _ = write_txn.open_table(CATEGORY_COUNTERS_TABLE)?;
            let _ = write_txn.open_table(REPORTS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(PRODUCT_SEQUENCE_KEY)?.is_none() {
                seq_table.insert(PRODUCT_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Last issued product sequence value
    pub fn current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(PRODUCT_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }
}

impl RecordStore for RedbStore {
    fn begin_read(&self) -> StorageResult<Box<dyn StoreRead + '_>> {
        Ok(Box::new(RedbRead {
            txn: self.db.begin_read()?,
        }))
    }

    fn begin_write(&self) -> StorageResult<Box<dyn StoreWrite + '_>> {
        Ok(Box::new(RedbWrite {
            txn: self.db.begin_write()?,
        }))
    }
}

// =============================================================================
// Table helpers (shared by read and write transactions)
// =============================================================================

fn load_product<T>(table: &T, id: u128) -> StorageResult<Option<Product>>
where
    T: ReadableTable<u128, &'static [u8]>,
{
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn find_products_in<T>(
    table: &T,
    filter: &ProductFilter,
    skip: u64,
    limit: u64,
) -> StorageResult<Vec<Product>>
where
    T: ReadableTable<u128, &'static [u8]>,
{
    let mut products = Vec::new();
    if limit == 0 {
        return Ok(products);
    }

    let mut skipped = 0u64;
    for entry in table.iter()? {
        let (_key, value) = entry?;
        let product: Product = serde_json::from_slice(value.value())?;
        if !filter.matches(&product) {
            continue;
        }
        if skipped < skip {
            skipped += 1;
            continue;
        }
        products.push(product);
        if products.len() as u64 >= limit {
            break;
        }
    }
    Ok(products)
}

fn count_products_in<T>(table: &T, filter: &ProductFilter) -> StorageResult<u64>
where
    T: ReadableTable<u128, &'static [u8]> + ReadableTableMetadata,
{
    if filter.search.is_none() {
        return Ok(table.len()?);
    }

    let mut count = 0u64;
    for entry in table.iter()? {
        let (_key, value) = entry?;
        let product: Product = serde_json::from_slice(value.value())?;
        if filter.matches(&product) {
            count += 1;
        }
    }
    Ok(count)
}

fn scan_category_in<I, P>(index: &I, products: &P, plan: &ScanPlan) -> StorageResult<Vec<Product>>
where
    I: ReadableTable<(&'static str, u128), ()>,
    P: ReadableTable<u128, &'static [u8]>,
{
    let category = plan.category.as_str();
    let lower = Bound::Included((category, 0u128));
    let upper = Bound::Included((category, u128::MAX));
    let bounds = match plan.start {
        ScanStart::First => (lower, upper),
        ScanStart::After(cursor) => (Bound::Excluded((category, cursor.value())), upper),
        ScanStart::Before(cursor) => (lower, Bound::Excluded((category, cursor.value()))),
    };

    let range = index.range(bounds)?;
    let mut ids = Vec::with_capacity(plan.fetch);
    if plan.is_reverse() {
        for entry in range.rev().take(plan.fetch) {
            let (key, _) = entry?;
            ids.push(key.value().1);
        }
    } else {
        for entry in range.take(plan.fetch) {
            let (key, _) = entry?;
            ids.push(key.value().1);
        }
    }

    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        match load_product(products, id)? {
            Some(product) => rows.push(product),
            None => tracing::warn!(
                category = %plan.category,
                id = %ProductId::from_sequence(id),
                "Category index points at a missing product"
            ),
        }
    }
    Ok(rows)
}

fn load_report<T>(table: &T, name: &str) -> StorageResult<Option<ReportAggregate>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(name)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn load_counter<T>(table: &T, name: &str) -> StorageResult<Option<CategoryCounter>>
where
    T: ReadableTable<&'static str, u64>,
{
    Ok(table
        .get(name)?
        .map(|guard| CategoryCounter::new(name, guard.value())))
}

fn top_counters<T>(table: &T, n: usize) -> StorageResult<Vec<CategoryCounter>>
where
    T: ReadableTable<&'static str, u64>,
{
    let mut counters = Vec::new();
    for entry in table.iter()? {
        let (key, value) = entry?;
        counters.push(CategoryCounter::new(key.value(), value.value()));
    }
    counters.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counters.truncate(n);
    Ok(counters)
}

// =============================================================================
// Read transaction
// =============================================================================

/// Read-only snapshot
pub struct RedbRead {
    txn: ReadTransaction,
}

impl StoreRead for RedbRead {
    fn get_product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        load_product(&table, id.value())
    }

    fn find_products(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> StorageResult<Vec<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        find_products_in(&table, filter, skip, limit)
    }

    fn count_products(&self, filter: &ProductFilter) -> StorageResult<u64> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        count_products_in(&table, filter)
    }

    fn scan_category(&self, plan: &ScanPlan) -> StorageResult<Vec<Product>> {
        let index = self.txn.open_table(CATEGORY_INDEX_TABLE)?;
        let products = self.txn.open_table(PRODUCTS_TABLE)?;
        scan_category_in(&index, &products, plan)
    }

    fn get_report(&self, name: &str) -> StorageResult<Option<ReportAggregate>> {
        let table = self.txn.open_table(REPORTS_TABLE)?;
        load_report(&table, name)
    }

    fn get_category_counter(&self, name: &str) -> StorageResult<Option<CategoryCounter>> {
        let table = self.txn.open_table(CATEGORY_COUNTERS_TABLE)?;
        load_counter(&table, name)
    }

    fn top_categories(&self, n: usize) -> StorageResult<Vec<CategoryCounter>> {
        let table = self.txn.open_table(CATEGORY_COUNTERS_TABLE)?;
        top_counters(&table, n)
    }
}

// =============================================================================
// Write transaction
// =============================================================================

/// Write transaction (dropped without commit = rolled back)
pub struct RedbWrite {
    txn: WriteTransaction,
}

impl RedbWrite {
    fn next_product_id(&self) -> StorageResult<ProductId> {
        let mut table = self.txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(PRODUCT_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or(StorageError::SequenceExhausted(PRODUCT_SEQUENCE_KEY))?;
        table.insert(PRODUCT_SEQUENCE_KEY, next)?;
        Ok(ProductId::from_sequence(u128::from(next)))
    }

    fn put_product(&self, product: &Product) -> StorageResult<()> {
        let mut table = self.txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id.value(), value.as_slice())?;
        Ok(())
    }
}

impl StoreRead for RedbWrite {
    fn get_product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        load_product(&table, id.value())
    }

    fn find_products(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> StorageResult<Vec<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        find_products_in(&table, filter, skip, limit)
    }

    fn count_products(&self, filter: &ProductFilter) -> StorageResult<u64> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        count_products_in(&table, filter)
    }

    fn scan_category(&self, plan: &ScanPlan) -> StorageResult<Vec<Product>> {
        let index = self.txn.open_table(CATEGORY_INDEX_TABLE)?;
        let products = self.txn.open_table(PRODUCTS_TABLE)?;
        scan_category_in(&index, &products, plan)
    }

    fn get_report(&self, name: &str) -> StorageResult<Option<ReportAggregate>> {
        let table = self.txn.open_table(REPORTS_TABLE)?;
        load_report(&table, name)
    }

    fn get_category_counter(&self, name: &str) -> StorageResult<Option<CategoryCounter>> {
        let table = self.txn.open_table(CATEGORY_COUNTERS_TABLE)?;
        load_counter(&table, name)
    }

    fn top_categories(&self, n: usize) -> StorageResult<Vec<CategoryCounter>> {
        let table = self.txn.open_table(CATEGORY_COUNTERS_TABLE)?;
        top_counters(&table, n)
    }
}

impl StoreWrite for RedbWrite {
    fn insert_product(&mut self, content: &ProductCreate) -> StorageResult<ProductId> {
        let id = self.next_product_id()?;
        let product = Product::with_content(id, content.clone());
        self.put_product(&product)?;

        let mut index = self.txn.open_table(CATEGORY_INDEX_TABLE)?;
        index.insert((product.category.as_str(), id.value()), ())?;
        Ok(id)
    }

    fn replace_product(
        &mut self,
        expected: &Product,
        content: &ProductCreate,
    ) -> StorageResult<u64> {
        let current = {
            let table = self.txn.open_table(PRODUCTS_TABLE)?;
            load_product(&table, expected.id.value())?
        };
        if current.as_ref() != Some(expected) {
            return Ok(0);
        }

        let updated = Product::with_content(expected.id, content.clone());
        self.put_product(&updated)?;

        if updated.category != expected.category {
            let mut index = self.txn.open_table(CATEGORY_INDEX_TABLE)?;
            index.remove((expected.category.as_str(), expected.id.value()))?;
            index.insert((updated.category.as_str(), updated.id.value()), ())?;
        }
        Ok(1)
    }

    fn delete_product(&mut self, id: ProductId) -> StorageResult<Option<Product>> {
        let removed: Option<Product> = {
            let mut table = self.txn.open_table(PRODUCTS_TABLE)?;
            let guard = table.remove(id.value())?;
            match guard {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            }
        };

        if let Some(product) = &removed {
            let mut index = self.txn.open_table(CATEGORY_INDEX_TABLE)?;
            index.remove((product.category.as_str(), id.value()))?;
        }
        Ok(removed)
    }

    fn increment_category(&mut self, name: &str, delta: i64) -> StorageResult<()> {
        let mut table = self.txn.open_table(CATEGORY_COUNTERS_TABLE)?;
        let current = table.get(name)?.map(|guard| guard.value()).unwrap_or(0);
        let next = if delta >= 0 {
            current.saturating_add(delta.unsigned_abs())
        } else {
            if current < delta.unsigned_abs() {
                tracing::warn!(
                    category = name,
                    current,
                    delta,
                    "Category counter would go negative, flooring at zero"
                );
            }
            current.saturating_sub(delta.unsigned_abs())
        };
        table.insert(name, next)?;
        Ok(())
    }

    fn increment_report(&mut self, name: &str, delta: &ReportDelta) -> StorageResult<()> {
        let mut table = self.txn.open_table(REPORTS_TABLE)?;
        let mut aggregate = load_report(&table, name)?.unwrap_or_else(|| ReportAggregate::empty(name));
        delta.apply_to(&mut aggregate)?;

        let value = serde_json::to_vec(&aggregate)?;
        table.insert(name, value.as_slice())?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        self.txn.commit()?;
        Ok(())
    }

    fn abort(self: Box<Self>) -> StorageResult<()> {
        self.txn.abort()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AggregateDelta;
    use shared::models::Direction;

    fn content(name: &str, category: &str, price: f64, stock: u32) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            category: category.to_string(),
            price,
            stock,
            brand: "ADIDAS".to_string(),
        }
    }

    fn insert(store: &RedbStore, items: &[ProductCreate]) -> Vec<ProductId> {
        let mut txn = store.begin_write().unwrap();
        let ids = items
            .iter()
            .map(|c| txn.insert_product(c).unwrap())
            .collect();
        txn.commit().unwrap();
        ids
    }

    #[test]
    fn test_ids_follow_sequence() {
        let store = RedbStore::open_in_memory().unwrap();
        let ids = insert(
            &store,
            &[
                content("Balon", "FUTBOL", 10.0, 1),
                content("Red", "FUTBOL", 20.0, 2),
            ],
        );
        assert_eq!(ids[0].value(), 1);
        assert_eq!(ids[1].value(), 2);
        assert_eq!(store.current_sequence().unwrap(), 2);
    }

    #[test]
    fn test_abort_discards_writes() {
        let store = RedbStore::open_in_memory().unwrap();
        let mut txn = store.begin_write().unwrap();
        let id = txn.insert_product(&content("Balon", "FUTBOL", 10.0, 1)).unwrap();
        txn.increment_category("FUTBOL", 1).unwrap();
        txn.abort().unwrap();

        let read = store.begin_read().unwrap();
        assert!(read.get_product(id).unwrap().is_none());
        assert!(read.get_category_counter("FUTBOL").unwrap().is_none());
        assert_eq!(store.current_sequence().unwrap(), 0);
    }

    #[test]
    fn test_find_and_count_with_search() {
        let store = RedbStore::open_in_memory().unwrap();
        insert(
            &store,
            &[
                content("Balon Mundial", "FUTBOL", 10.0, 1),
                content("Raqueta", "TENIS", 20.0, 2),
                content("balon playa", "VOLEY", 5.0, 3),
            ],
        );

        let read = store.begin_read().unwrap();
        let filter = ProductFilter::by_name(Some("BALON"));
        assert_eq!(read.count_products(&filter).unwrap(), 2);
        assert_eq!(read.count_products(&ProductFilter::default()).unwrap(), 3);

        let page = read.find_products(&filter, 1, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "balon playa");

        let all = read.find_products(&ProductFilter::default(), 0, 2).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
    }

    #[test]
    fn test_scan_category_ranges() {
        let store = RedbStore::open_in_memory().unwrap();
        let mut items = Vec::new();
        for i in 0..12 {
            items.push(content(&format!("Balon {i}"), "FUTBOL", 10.0, 1));
            items.push(content(&format!("Raqueta {i}"), "TENIS", 10.0, 1));
        }
        let ids = insert(&store, &items);
        let futbol: Vec<ProductId> = ids.iter().step_by(2).copied().collect();

        let read = store.begin_read().unwrap();
        let plan = ScanPlan::new("FUTBOL", None, 5);
        let first = plan.build_page(read.scan_category(&plan).unwrap());
        assert_eq!(
            first.products.iter().map(|p| p.id).collect::<Vec<_>>(),
            futbol[0..5].to_vec()
        );
        assert_eq!(first.next, Some(futbol[4]));

        let plan = ScanPlan::new("FUTBOL", Some((Direction::Next, futbol[4])), 5);
        let second = plan.build_page(read.scan_category(&plan).unwrap());
        assert_eq!(second.products[0].id, futbol[5]);
        assert!(second.products.iter().all(|p| p.category == "FUTBOL"));
        assert_eq!(second.previous, Some(futbol[5]));

        let plan = ScanPlan::new("FUTBOL", Some((Direction::Previous, futbol[5])), 5);
        let rows = read.scan_category(&plan).unwrap();
        // reverse scans come back in descending order
        assert_eq!(rows[0].id, futbol[4]);
        let back = plan.build_page(rows);
        assert_eq!(back.products, first.products);
    }

    #[test]
    fn test_replace_is_compare_and_set() {
        let store = RedbStore::open_in_memory().unwrap();
        let ids = insert(&store, &[content("Balon", "FUTBOL", 10.0, 1)]);

        let mut txn = store.begin_write().unwrap();
        let current = txn.get_product(ids[0]).unwrap().unwrap();
        let stale = Product {
            stock: 99,
            ..current.clone()
        };

        let moved = content("Balon", "PLAYA", 10.0, 1);
        assert_eq!(txn.replace_product(&stale, &moved).unwrap(), 0);
        assert_eq!(txn.replace_product(&current, &moved).unwrap(), 1);
        txn.commit().unwrap();

        let read = store.begin_read().unwrap();
        assert_eq!(read.get_product(ids[0]).unwrap().unwrap().category, "PLAYA");
        let plan = ScanPlan::new("FUTBOL", None, 5);
        assert!(read.scan_category(&plan).unwrap().is_empty());
        let plan = ScanPlan::new("PLAYA", None, 5);
        assert_eq!(read.scan_category(&plan).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let store = RedbStore::open_in_memory().unwrap();
        let ids = insert(&store, &[content("Balon", "FUTBOL", 10.0, 1)]);

        let mut txn = store.begin_write().unwrap();
        let removed = txn.delete_product(ids[0]).unwrap();
        assert_eq!(removed.map(|p| p.name), Some("Balon".to_string()));
        assert!(txn.delete_product(ids[0]).unwrap().is_none());
        txn.commit().unwrap();

        let read = store.begin_read().unwrap();
        let plan = ScanPlan::new("FUTBOL", None, 5);
        assert!(read.scan_category(&plan).unwrap().is_empty());
    }

    #[test]
    fn test_counters_upsert_and_floor_at_zero() {
        let store = RedbStore::open_in_memory().unwrap();
        let mut txn = store.begin_write().unwrap();
        txn.increment_category("FUTBOL", 1).unwrap();
        txn.increment_category("FUTBOL", -1).unwrap();
        txn.increment_category("FUTBOL", -1).unwrap();
        txn.commit().unwrap();

        let read = store.begin_read().unwrap();
        let counter = read.get_category_counter("FUTBOL").unwrap().unwrap();
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn test_top_categories_order() {
        let store = RedbStore::open_in_memory().unwrap();
        let mut txn = store.begin_write().unwrap();
        txn.increment_category("TENIS", 2).unwrap();
        txn.increment_category("FUTBOL", 3).unwrap();
        txn.increment_category("PADEL", 2).unwrap();
        txn.increment_category("GOLF", 1).unwrap();
        txn.commit().unwrap();

        let read = store.begin_read().unwrap();
        let top = read.top_categories(3).unwrap();
        let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["FUTBOL", "PADEL", "TENIS"]);
    }

    #[test]
    fn test_report_upsert() {
        let store = RedbStore::open_in_memory().unwrap();
        let item = content("Balon", "FUTBOL", 10.5, 3);

        let mut txn = store.begin_write().unwrap();
        assert!(txn.get_report(ReportAggregate::GENERAL).unwrap().is_none());
        txn.insert_product(&item).unwrap();
        AggregateDelta::on_create(&item).apply(txn.as_mut()).unwrap();
        txn.commit().unwrap();

        let read = store.begin_read().unwrap();
        let report = read.get_report(ReportAggregate::GENERAL).unwrap().unwrap();
        assert_eq!(report.total_products, 1);
        assert_eq!(report.total_stock, 3);
        assert_eq!(report.total_pricing.to_string(), "10.5");
        assert_eq!(read.get_category_counter("FUTBOL").unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.redb");

        let id = {
            let store = RedbStore::open(&path).unwrap();
            insert(&store, &[content("Balon", "FUTBOL", 10.0, 1)])[0]
        };

        let store = RedbStore::open(&path).unwrap();
        let read = store.begin_read().unwrap();
        assert!(read.get_product(id).unwrap().is_some());
        drop(read);
        let next = insert(&store, &[content("Red", "FUTBOL", 5.0, 1)])[0];
        assert!(next > id);
    }
}
