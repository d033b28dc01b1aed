//! Common utilities and types shared across minifrag

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod partition;
pub mod tracing_middleware;

pub use config::{Config, CoordinatorConfig, SiteConfig, SiteEndpoints};
pub use error::{Error, Result};
pub use metrics::MetricsRegistry;
pub use model::{
    Course, Enrollment, EnrollmentCount, EnrollmentDetail, EnrollmentStatus, Faculty, Student,
};
pub use partition::{
    Partition, SiteId, ADVANCED_CREDITS_THRESHOLD, SENIOR_YEAR_THRESHOLD, SUPPORTED_DEPARTMENT,
};

/// Resolves on Ctrl-C; used for graceful HTTP shutdown
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
