//! Coordinator server

use crate::common::{shutdown_signal, CoordinatorConfig, Result};
use crate::coordinator::http::{create_router, CoordState};
use crate::coordinator::router::DecisionRouter;
use tokio::net::TcpListener;

pub struct Coordinator {
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        tracing::info!("Starting coordinator");
        tracing::info!("  HTTP API: {}", listener.local_addr()?);
        tracing::info!("  Site A: {}", self.config.sites.site_a);
        tracing::info!("  Site B: {}", self.config.sites.site_b);
        tracing::info!("  Department: {}", self.config.department);
        tracing::info!("  Site timeout: {}ms", self.config.request_timeout_ms);

        let router = DecisionRouter::from_config(&self.config)?;
        let app = create_router(CoordState::new(router));

        tracing::info!("✓ Coordinator ready");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Coordinator stopped");
        Ok(())
    }
}
