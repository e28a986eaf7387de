//! Report API 模块

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};

use crate::api::query_rejection;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::ApiResponse;
use shared::models::{GeneralReport, ReportQuery};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports/general", get(general))
}

/// GET /api/reports/general?topCategories=N - 全局统计 + 前 N 个分类
pub async fn general(
    State(state): State<ServerState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<GeneralReport>>> {
    let Query(query) = query.map_err(query_rejection)?;
    let report = state.reports.general_report(query.top_categories)?;
    Ok(Json(ApiResponse::success(report)))
}
