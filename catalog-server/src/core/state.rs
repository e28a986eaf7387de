use std::sync::Arc;
use std::time::Duration;

use crate::cache::MemoryCache;
use crate::core::{Config, Result};
use crate::db::RedbStore;
use crate::services::{CatalogService, ReportService};

/// Interval of the expired cache entry sweep
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，Clone 成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<RedbStore> | 嵌入式记录存储 |
/// | cache | Arc<MemoryCache> | 进程内缓存 |
/// | catalog | CatalogService | 商品服务 |
/// | reports | ReportService | 报表服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 记录存储 (redb)
    pub store: Arc<RedbStore>,
    /// 缓存
    pub cache: Arc<MemoryCache>,
    /// 商品服务
    pub catalog: CatalogService,
    /// 报表服务
    pub reports: ReportService,
}

impl ServerState {
    /// 由已打开的存储构造服务器状态
    pub fn new(config: Config, store: Arc<RedbStore>) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let catalog = CatalogService::new(store.clone(), cache.clone(), config.cache_ttl());
        let reports = ReportService::new(store.clone());
        Self {
            config,
            store,
            cache,
            catalog,
            reports,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (DATABASE_PATH)
    /// 3. 各服务 (Catalog, Report)
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let store = RedbStore::open(&config.database_path)?;
        tracing::info!(path = %config.database_path, "Record store opened");

        Ok(Self::new(config.clone(), Arc::new(store)))
    }

    /// 使用内存数据库初始化 (测试 / 临时运行)
    pub fn in_memory(config: Config) -> Result<Self> {
        let store = RedbStore::open_in_memory()?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// 启动后台任务
    ///
    /// - 过期缓存清理
    pub fn start_background_tasks(&self) -> tokio::task::JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Expired cache entries purged");
                }
            }
        })
    }
}
