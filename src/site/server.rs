//! Fragment site server

use crate::common::{shutdown_signal, Partition, Result, SiteConfig};
use crate::site::http::{create_router, SiteState};
use crate::site::import::{import, Dataset};
use crate::site::store::FragmentStore;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct FragmentSite {
    config: SiteConfig,
}

impl FragmentSite {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    pub fn site_name(partition: Partition) -> String {
        partition.site().to_string()
    }

    /// Import the dataset and serve it.
    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting fragment site");
        tracing::info!("  Partition: {}", self.config.partition);
        tracing::info!("  Data dir: {}", self.config.data_dir.display());

        let dataset = Dataset::load_dir(&self.config.data_dir)?;
        let (store, _report) = import(&dataset, self.config.partition);

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        serve_store(store, listener).await
    }
}

/// Serve an already imported store on a bound listener
pub async fn serve_store(store: FragmentStore, listener: TcpListener) -> Result<()> {
    let site_name = FragmentSite::site_name(store.partition());
    tracing::info!("  HTTP API: {}", listener.local_addr()?);

    let app = create_router(SiteState {
        store: Arc::new(store),
        site_name: site_name.clone(),
    });

    tracing::info!("✓ Fragment site {} ready", site_name);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Fragment site {} stopped", site_name);
    Ok(())
}
