//! 服务层 - 业务服务
//!
//! # 服务列表
//!
//! - [`CatalogService`] - 商品读写、聚合维护与缓存
//! - [`ReportService`] - 统计报表
//! - [`HttpService`] - HTTP 路由与服务

pub mod catalog_service;
pub mod http_service;
pub mod report_service;

pub use catalog_service::CatalogService;
pub use http_service::HttpService;
pub use report_service::ReportService;
