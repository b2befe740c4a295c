//! HTTP server lifecycle.

use crate::routes;
use crate::state::AppState;
use anyhow::Context;
use tokio::net::TcpListener;

/// The favorites API server.
pub struct WallflowServer {
    state: AppState,
}

impl WallflowServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn bind_addr(&self) -> &str {
        &self.state.config().server.bind
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.bind_addr().to_string();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let local = listener.local_addr()?;
        tracing::info!(address = %local, "Starting wallflow server");

        let app = routes::create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
