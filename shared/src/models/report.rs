//! Report Model
//!
//! 全局统计聚合: 商品总数 / 库存总量 / 价值总额

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::category::CategoryCounter;

/// Decimal places of monetary report values
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value for output
fn round_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Stored running totals over all products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAggregate {
    /// Aggregate name (only [`ReportAggregate::GENERAL`] is maintained)
    pub name: String,
    pub total_products: i64,
    pub total_stock: i64,
    /// Sum of `price` over all products
    pub total_pricing: Decimal,
}

impl ReportAggregate {
    /// Name of the single global aggregate
    pub const GENERAL: &'static str = "GENERAL";

    /// Empty aggregate
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_products: 0,
            total_stock: 0,
            total_pricing: Decimal::ZERO,
        }
    }
}

/// Query of the general report (`?topCategories`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "topCategories")]
    pub top_categories: Option<u64>,
}

/// General report response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralReport {
    pub name: String,
    pub total_products: i64,
    pub total_stock: i64,
    /// Rounded to 2 decimals
    pub total_pricing: f64,
    /// `total_pricing / total_products`, rounded to 2 decimals (0 when empty)
    pub average_price: f64,
    /// Names of the top categories by product count
    pub top_categories: Vec<String>,
}

impl GeneralReport {
    /// Derive the report from the stored aggregate and the top categories
    pub fn from_aggregate(
        aggregate: &ReportAggregate,
        top_categories: Vec<CategoryCounter>,
    ) -> Self {
        let average = if aggregate.total_products > 0 {
            aggregate.total_pricing / Decimal::from(aggregate.total_products)
        } else {
            Decimal::ZERO
        };

        Self {
            name: aggregate.name.clone(),
            total_products: aggregate.total_products,
            total_stock: aggregate.total_stock,
            total_pricing: round_money(aggregate.total_pricing),
            average_price: round_money(average),
            top_categories: top_categories.into_iter().map(|c| c.name).collect(),
        }
    }
}
