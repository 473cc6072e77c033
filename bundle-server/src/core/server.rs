//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, PrintQueue, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let (state, queue) = ServerState::initialize(&self.config)?;

        let shutdown = CancellationToken::new();

        // 打印 worker 在监听端口前启动
        let worker_handle = queue.map(|PrintQueue { worker, rx }| {
            tokio::spawn(worker.run(rx, shutdown.clone()))
        });

        let app = crate::api::build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Bundle server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .await?;

        shutdown.cancel();
        if let Some(handle) = worker_handle
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "Print worker terminated abnormally");
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
        _ = token.cancelled() => {}
    }
}
