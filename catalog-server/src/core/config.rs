use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置 - 目录服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | WORK_DIR/catalog.redb | redb 数据库文件 |
/// | HTTP_PORT | 3002 | HTTP 服务端口 |
/// | CACHE_TTL_SECS | 600 | 单个商品缓存 TTL (列表为 1/3) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 日志目录 (存在时按天滚动写文件) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | RATE_LIMIT_MAX_REQUESTS | 100 | 每个窗口允许的请求数 (0 = 不限流) |
/// | RATE_LIMIT_WINDOW_MS | 1000 | 限流窗口(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/catalog HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 缓存 TTL (秒)
    pub cache_ttl_secs: u64,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别 (RUST_LOG 优先)
    pub log_level: String,
    /// 是否输出 JSON 日志
    pub log_json: bool,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 每个限流窗口允许的请求数
    pub rate_limit_max_requests: u64,
    /// 限流窗口 (毫秒)
    pub rate_limit_window_ms: u64,
}

/// Default TTL of cached products
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Database file name inside the work dir
const DATABASE_FILE: &str = "catalog.redb";

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join(DATABASE_FILE)
                .to_string_lossy()
                .into_owned()
        });

        Self {
            work_dir,
            database_path,
            http_port: env_or("HTTP_PORT", 3002),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", 1_000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = config
            .work_dir_path()
            .join(DATABASE_FILE)
            .to_string_lossy()
            .into_owned();
        config.http_port = http_port;
        config
    }

    pub fn work_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    /// 确保工作目录及数据库所在目录存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.work_dir_path())?;
        if let Some(parent) = PathBuf::from(&self.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 单个商品缓存 TTL
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 限流配置: (窗口内请求数, 窗口)
    ///
    /// 任一值为 0 时关闭限流
    pub fn rate_limit(&self) -> Option<(u64, Duration)> {
        if self.rate_limit_max_requests == 0 || self.rate_limit_window_ms == 0 {
            return None;
        }
        Some((
            self.rate_limit_max_requests,
            Duration::from_millis(self.rate_limit_window_ms),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_move_database_into_work_dir() {
        let config = Config::with_overrides("/tmp/catalog-test", 4000);
        assert_eq!(config.http_port, 4000);
        assert!(config.database_path.ends_with("catalog.redb"));
        assert!(config.database_path.starts_with("/tmp/catalog-test"));
    }

    #[test]
    fn test_rate_limit_disabled_by_zero() {
        let mut config = Config::with_overrides("/tmp/catalog-test", 4000);
        config.rate_limit_max_requests = 5;
        config.rate_limit_window_ms = 2_000;
        assert_eq!(config.rate_limit(), Some((5, Duration::from_secs(2))));

        config.rate_limit_max_requests = 0;
        assert_eq!(config.rate_limit(), None);

        config.rate_limit_max_requests = 5;
        config.rate_limit_window_ms = 0;
        assert_eq!(config.rate_limit(), None);
    }

    #[test]
    fn test_ensure_work_dir_structure() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("nested/work");
        let config = Config::with_overrides(work_dir.to_string_lossy(), 4000);

        config.ensure_work_dir_structure().unwrap();
        assert!(work_dir.exists());
    }
}
