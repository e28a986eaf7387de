//! 目录核心逻辑 - 分页引擎与聚合维护
//!
//! 这里只有纯计算, 不持有事务也不访问缓存:
//!
//! - [`pagination`] - 游标 / 偏移分页计划与链接计算
//! - [`aggregates`] - 商品变更对应的统计增量

pub mod aggregates;
pub mod pagination;

pub use aggregates::{AggregateDelta, ReportDelta};
pub use pagination::{OffsetLinks, ScanPlan, ScanStart};
