use crate::core::{Result, ServerState};
use crate::utils::AppError;
use axum::error_handling::HandleErrorLayer;
use axum::{Router, middleware};
use std::net::SocketAddr;
use std::time::Duration;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::load_shed::LoadShedLayer;
use tower::{BoxError, ServiceBuilder, ServiceExt};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub type OneshotResult = std::result::Result<http::Response<axum::body::Body>, std::convert::Infallible>;

/// Requests queued in front of the rate limiter
const RATE_LIMIT_QUEUE: usize = 1024;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    tracing::info!(target: "http_access", elapsed_ms, "{} {} {}", method, uri, status);

    response
}

/// 未匹配的路由
async fn route_not_found(uri: http::Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}

/// 限流层错误 -> 429 / 500
async fn handle_limit_error(err: BoxError) -> AppError {
    if err.is::<tower::load_shed::error::Overloaded>() {
        tracing::warn!("Request rejected by rate limit");
        AppError::too_many_requests()
    } else {
        AppError::internal(format!("Request pipeline failed: {err}"))
    }
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::products::router())
        .merge(crate::api::reports::router())
        .fallback(route_not_found)
}

/// 全局限流: 每个窗口最多 `requests` 个请求, 超出的请求直接返回 429
fn rate_limited(app: Router, requests: u64, per: Duration) -> Router {
    let limited = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_limit_error))
        .layer(BufferLayer::new(RATE_LIMIT_QUEUE))
        .layer(LoadShedLayer::new())
        .layer(RateLimitLayer::new(requests, per))
        .service(app);

    Router::new().fallback_service(limited)
}

/// HTTP 服务 - 绑定状态后的路由与监听
#[derive(Clone, Debug)]
pub struct HttpService {
    port: u16,
    router: Router,
}

impl HttpService {
    /// Must be called inside a tokio runtime (the rate limiter spawns its worker)
    pub fn new(state: ServerState) -> Self {
        let port = state.config.http_port;
        let timeout = state.config.request_timeout();
        let rate_limit = state.config.rate_limit();

        let app = build_app()
            .with_state(state)
            // Tower HTTP 中间件
            .layer(TimeoutLayer::new(timeout))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive());

        let router = match rate_limit {
            Some((requests, per)) => rate_limited(app, requests, per),
            None => app,
        }
        // HTTP 请求日志中间件 (包含被限流的请求)
        .layer(middleware::from_fn(log_request));

        Self { port, router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Dispatch a single request through the full middleware stack
    pub async fn oneshot(&self, request: http::Request<axum::body::Body>) -> OneshotResult {
        self.router.clone().oneshot(request).await
    }

    /// Start the HTTP server and serve until `shutdown_signal` resolves
    pub async fn start_server<F>(&self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🚀 Starting HTTP server on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
