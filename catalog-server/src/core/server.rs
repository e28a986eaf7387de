//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::core::{Config, Result, ServerState};
use crate::services::HttpService;

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(&self) -> Result<()> {
        // Start background tasks
        let purge_task = self.state.start_background_tasks();

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        tracing::info!(port = self.config.http_port, "Serving catalog API");
        let http = HttpService::new(self.state.clone());
        let result = http.start_server(shutdown).await;

        purge_task.abort();
        result
    }
}
