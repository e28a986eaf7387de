//! Report Service - 统计报表读模型
//!
//! 报表只读取维护好的聚合与分类计数, 不做全表扫描。
//! `average_price` 与 `top_categories` 在读取时计算。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{GeneralReport, ReportAggregate};
use std::sync::Arc;

use crate::db::RecordStore;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService").finish_non_exhaustive()
    }
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// General report with the `top_categories` largest categories
    pub fn general_report(&self, top_categories: Option<u64>) -> AppResult<GeneralReport> {
        let top = match top_categories {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => {
                return Err(
                    AppError::validation("topCategories must be a positive integer")
                        .with_detail("field", "topCategories"),
                );
            }
        };

        let txn = self.store.begin_read()?;
        let aggregate = txn
            .get_report(ReportAggregate::GENERAL)?
            .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound))?;
        let categories = txn.top_categories(top)?;

        Ok(GeneralReport::from_aggregate(&aggregate, categories))
    }
}
