//! Aggregate maintenance
//!
//! 商品的每次写入都伴随统计增量, 并在同一事务中应用:
//!
//! | 操作 | total_products | total_stock | total_pricing | 分类计数 |
//! |------|----------------|-------------|---------------|----------|
//! | 创建 | +1 | +stock | +price | 新分类 +1 |
//! | 更新 | 0 | new - old | new - old | 分类变化时 旧 -1 / 新 +1 |
//! | 删除 | -1 | -stock | -price | 分类 -1 |

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use shared::models::{Product, ProductCreate, ReportAggregate};

use crate::db::{StorageError, StorageResult, StoreWrite};

/// Convert a price to Decimal for accumulation
///
/// Non-finite values never pass validation; they count as zero here.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite price in aggregate delta, defaulting to zero");
        Decimal::ZERO
    })
}

/// Signed change of the report aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportDelta {
    pub products: i64,
    pub stock: i64,
    pub pricing: Decimal,
}

impl ReportDelta {
    pub fn is_zero(&self) -> bool {
        self.products == 0 && self.stock == 0 && self.pricing.is_zero()
    }

    /// Add this delta onto a stored aggregate
    ///
    /// The aggregate is left untouched when any field would overflow.
    pub fn apply_to(&self, aggregate: &mut ReportAggregate) -> StorageResult<()> {
        let total_products = aggregate
            .total_products
            .checked_add(self.products)
            .ok_or(StorageError::AggregateOverflow("total_products"))?;
        let total_stock = aggregate
            .total_stock
            .checked_add(self.stock)
            .ok_or(StorageError::AggregateOverflow("total_stock"))?;
        let total_pricing = aggregate
            .total_pricing
            .checked_add(self.pricing)
            .ok_or(StorageError::AggregateOverflow("total_pricing"))?;

        aggregate.total_products = total_products;
        aggregate.total_stock = total_stock;
        aggregate.total_pricing = total_pricing;
        Ok(())
    }
}

/// All aggregate changes caused by one product mutation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateDelta {
    pub report: ReportDelta,
    /// (canonical category, signed change)
    pub categories: Vec<(String, i64)>,
}

impl AggregateDelta {
    pub fn on_create(content: &ProductCreate) -> Self {
        Self {
            report: ReportDelta {
                products: 1,
                stock: i64::from(content.stock),
                pricing: to_decimal(content.price),
            },
            categories: vec![(content.category.clone(), 1)],
        }
    }

    /// Counters move only when the category changes
    pub fn on_update(old: &Product, new: &ProductCreate) -> Self {
        let categories = if old.category != new.category {
            vec![(old.category.clone(), -1), (new.category.clone(), 1)]
        } else {
            Vec::new()
        };

        Self {
            report: ReportDelta {
                products: 0,
                stock: i64::from(new.stock) - i64::from(old.stock),
                pricing: to_decimal(new.price) - to_decimal(old.price),
            },
            categories,
        }
    }

    pub fn on_delete(product: &Product) -> Self {
        Self {
            report: ReportDelta {
                products: -1,
                stock: -i64::from(product.stock),
                pricing: -to_decimal(product.price),
            },
            categories: vec![(product.category.clone(), -1)],
        }
    }

    /// Apply inside the caller's write transaction
    pub fn apply<W: StoreWrite + ?Sized>(&self, txn: &mut W) -> StorageResult<()> {
        if !self.report.is_zero() {
            txn.increment_report(ReportAggregate::GENERAL, &self.report)?;
        }
        for (category, delta) in &self.categories {
            txn.increment_category(category, *delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ProductId;
    use std::str::FromStr;

    fn product(category: &str, price: f64, stock: u32) -> Product {
        Product {
            id: ProductId::from_sequence(1),
            name: "Raqueta".to_string(),
            category: category.to_string(),
            price,
            stock,
            brand: "WILSON".to_string(),
        }
    }

    #[test]
    fn test_create_delta() {
        let content = product("TENIS", 99.9, 4).content();
        let delta = AggregateDelta::on_create(&content);

        assert_eq!(delta.report.products, 1);
        assert_eq!(delta.report.stock, 4);
        assert_eq!(delta.report.pricing, Decimal::from_str("99.9").unwrap());
        assert_eq!(delta.categories, vec![("TENIS".to_string(), 1)]);
    }

    #[test]
    fn test_delete_is_inverse_of_create() {
        let p = product("TENIS", 99.9, 4);
        let create = AggregateDelta::on_create(&p.content());
        let delete = AggregateDelta::on_delete(&p);

        let mut aggregate = ReportAggregate::empty(ReportAggregate::GENERAL);
        create.report.apply_to(&mut aggregate).unwrap();
        delete.report.apply_to(&mut aggregate).unwrap();
        assert_eq!(aggregate, ReportAggregate::empty(ReportAggregate::GENERAL));
        assert_eq!(delete.categories, vec![("TENIS".to_string(), -1)]);
    }

    #[test]
    fn test_update_same_category_touches_no_counter() {
        let old = product("TENIS", 10.0, 5);
        let new = ProductCreate {
            stock: 8,
            price: 12.5,
            ..old.content()
        };
        let delta = AggregateDelta::on_update(&old, &new);

        assert_eq!(delta.report.products, 0);
        assert_eq!(delta.report.stock, 3);
        assert_eq!(delta.report.pricing, Decimal::from_str("2.5").unwrap());
        assert!(delta.categories.is_empty());
    }

    #[test]
    fn test_update_category_change_moves_one_count() {
        let old = product("TENIS", 10.0, 5);
        let new = ProductCreate {
            category: "PADEL".to_string(),
            ..old.content()
        };
        let delta = AggregateDelta::on_update(&old, &new);

        assert!(delta.report.is_zero());
        assert_eq!(
            delta.categories,
            vec![("TENIS".to_string(), -1), ("PADEL".to_string(), 1)]
        );
    }

    #[test]
    fn test_stock_decrease() {
        let old = product("TENIS", 10.0, 5);
        let new = ProductCreate {
            stock: 0,
            ..old.content()
        };
        assert_eq!(AggregateDelta::on_update(&old, &new).report.stock, -5);
    }

    #[test]
    fn test_repeated_pricing_does_not_drift() {
        let mut aggregate = ReportAggregate::empty(ReportAggregate::GENERAL);
        let p = product("TENIS", 0.1, 1);
        for _ in 0..3 {
            AggregateDelta::on_create(&p.content())
                .report
                .apply_to(&mut aggregate)
                .unwrap();
        }
        assert_eq!(aggregate.total_pricing, Decimal::from_str("0.3").unwrap());
    }

    #[test]
    fn test_pricing_overflow_is_an_error() {
        let mut aggregate = ReportAggregate::empty(ReportAggregate::GENERAL);
        aggregate.total_pricing = Decimal::MAX;
        aggregate.total_products = 7;

        let delta = AggregateDelta::on_create(&product("TENIS", 1.0, 1).content());
        let err = delta.report.apply_to(&mut aggregate).unwrap_err();

        assert!(matches!(err, StorageError::AggregateOverflow("total_pricing")));
        assert_eq!(aggregate.total_products, 7);
        assert_eq!(aggregate.total_pricing, Decimal::MAX);
    }
}
