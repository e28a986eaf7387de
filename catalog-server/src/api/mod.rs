//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品管理接口 (分页、分类游标分页、增删改查)
//! - [`reports`] - 统计报表接口

pub mod health;
pub mod products;
pub mod reports;

use axum::extract::rejection::{JsonRejection, QueryRejection};

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// 查询参数解析失败 -> 校验错误
pub(crate) fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::validation(rejection.body_text())
}

/// 请求体解析失败 -> 校验错误
pub(crate) fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}
