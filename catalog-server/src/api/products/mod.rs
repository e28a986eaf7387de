//! Product API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/products | GET | 偏移分页 (`page`, `limit`, `search`) |
//! | /api/products | POST | 创建商品 |
//! | /api/products/category | GET | 分类游标分页 (`name`, `limit`, `direction`, `reference`) |
//! | /api/products/{id}/details | GET | 商品详情 |
//! | /api/products/{id} | PUT | 更新商品 |
//! | /api/products/{id} | DELETE | 删除商品 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/category", get(handler::list_by_category))
        .route("/{id}/details", get(handler::get_by_id))
        .route("/{id}", axum::routing::put(handler::update).delete(handler::delete))
}
