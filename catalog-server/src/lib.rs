//! Catalog Server - 商品目录服务
//!
//! # 架构概述
//!
//! 本 crate 提供商品目录的完整服务端实现：
//!
//! - **存储** (`db`): 嵌入式 redb 事务存储 (商品、分类索引、分类计数、报表聚合)
//! - **目录** (`catalog`): 聚合增量计算与分页算法
//! - **缓存** (`cache`): 带 TTL 的进程内缓存，写入后失效
//! - **服务** (`services`): 商品服务、报表服务、HTTP 服务
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! catalog-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── db/            # 存储 trait 与 redb 实现
//! ├── catalog/       # 聚合增量、游标 / 偏移分页
//! ├── cache/         # 缓存 trait 与内存实现
//! ├── services/      # 业务服务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod cache;
pub mod catalog;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use services::{CatalogService, HttpService, ReportService};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Days of rolled log files kept on startup
const LOG_RETENTION_DAYS: u64 = 14;

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在时忽略)
/// 2. 创建日志目录并按配置初始化日志
/// 3. 清理过期日志文件
pub fn setup_environment() -> std::io::Result<()> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    if let Some(dir) = config.log_dir.as_deref() {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );

    if let Some(dir) = config.log_dir.as_deref() {
        let removed = cleanup_old_logs(dir, LOG_RETENTION_DAYS)?;
        if removed > 0 {
            tracing::info!(removed, "Old log files removed");
        }
    }

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______      __        __
  / ____/___ _/ /_____ _/ /___  ____ _
 / /   / __ `/ __/ __ `/ / __ \/ __ `/
/ /___/ /_/ / /_/ /_/ / / /_/ / /_/ /
\____/\__,_/\__/\__,_/_/\____/\__, /
                             /____/
    "#
    );
}
