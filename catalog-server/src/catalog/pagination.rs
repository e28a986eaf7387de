//! Pagination engine
//!
//! Cursor pagination over one category, keyed on product identity, and
//! classic page/limit pagination for the product listing.

use shared::models::{CategoryPage, Direction, Product, ProductId};

/// Default page size of the category listing
pub const DEFAULT_CATEGORY_LIMIT: u64 = 10;

/// Starting point of a category scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStart {
    /// No cursor, first page in ascending order
    First,
    /// Ascending, identity strictly greater than the cursor
    After(ProductId),
    /// Descending, identity strictly less than the cursor
    Before(ProductId),
}

/// Store query derived from a cursor request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Canonical category name
    pub category: String,
    pub start: ScanStart,
    /// Rows to fetch (page size + 1 to detect a following page)
    pub fetch: usize,
}

impl ScanPlan {
    /// Build the scan for a category page
    ///
    /// A direction without a reference is a first-page request.
    pub fn new(category: impl Into<String>, cursor: Option<(Direction, ProductId)>, limit: usize) -> Self {
        let start = match cursor {
            None => ScanStart::First,
            Some((Direction::Next, id)) => ScanStart::After(id),
            Some((Direction::Previous, id)) => ScanStart::Before(id),
        };
        Self {
            category: category.into(),
            start,
            fetch: limit.saturating_add(1),
        }
    }

    /// Requested page size
    pub fn limit(&self) -> usize {
        self.fetch.saturating_sub(1)
    }

    /// Whether the store scans in descending identity order
    pub fn is_reverse(&self) -> bool {
        matches!(self.start, ScanStart::Before(_))
    }

    /// Turn the raw scan rows (in scan order) into a page with cursors
    pub fn build_page(&self, mut rows: Vec<Product>) -> CategoryPage {
        let has_extra = rows.len() > self.limit();
        rows.truncate(self.limit());
        if self.is_reverse() {
            rows.reverse();
        }

        let first = rows.first().map(|p| p.id);
        let last = rows.last().map(|p| p.id);

        let (next, previous) = match self.start {
            ScanStart::First => (last.filter(|_| has_extra), None),
            ScanStart::After(_) => (last.filter(|_| has_extra), first),
            ScanStart::Before(_) => (last, first.filter(|_| has_extra)),
        };

        CategoryPage {
            products: rows,
            next,
            previous,
        }
    }
}

/// Navigation of an offset page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetLinks {
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub pages: u64,
}

/// Rows skipped before `page` (1-based)
pub fn offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Compute page count and neighbour pages
///
/// `returned` is the number of rows on the current page; an empty page has
/// no neighbours.
pub fn offset_links(page: u64, limit: u64, total: u64, returned: usize) -> OffsetLinks {
    let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
    let empty = returned == 0;

    OffsetLinks {
        next: (!empty && page < pages).then(|| page + 1),
        previous: (!empty && page > 1).then(|| page - 1),
        pages,
    }
}
