//! Product API Handlers

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::api::{json_rejection, query_rejection};
use crate::catalog::pagination::DEFAULT_CATEGORY_LIMIT;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::ApiResponse;
use shared::models::{
    CategoryPage, CategoryQuery, Product, ProductCreate, ProductListQuery, ProductPage,
    ProductUpdate,
};

/// GET /api/products - 偏移分页获取商品
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ProductPage>>> {
    let Query(query) = query.map_err(query_rejection)?;
    let page = state.catalog.get_products(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/products/category - 按分类游标分页
///
/// 未提供 `limit` 时默认 10 条
pub async fn list_by_category(
    State(state): State<ServerState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<CategoryPage>>> {
    let Query(mut query) = query.map_err(query_rejection)?;
    query.limit.get_or_insert(DEFAULT_CATEGORY_LIMIT);
    let page = state.catalog.get_products_by_category(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/products/:id/details - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.catalog.get_product(&id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ProductCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let product = state.catalog.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// PUT /api/products/:id - 更新商品 (缺省字段保持不变)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let product = state.catalog.update_product(&id, payload).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
