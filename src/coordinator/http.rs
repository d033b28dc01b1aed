//! HTTP API for the coordinator
//!
//! `GET /?department=&queryType=&courseId=&facultyId=&credits=&year=` (also
//! served at `/query`) answers client queries. Errors are JSON objects with
//! `error`, `kind` and `site` fields.

use crate::common::metrics::MetricsRegistry;
use crate::common::tracing_middleware::request_tracing_middleware;
use crate::coordinator::classifier::{QueryRequest, QueryType};
use crate::coordinator::router::{DecisionRouter, QueryResponse};
use crate::{Error, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared coordinator state for HTTP handlers.
#[derive(Clone)]
pub struct CoordState {
    pub router: Arc<DecisionRouter>,
    pub metrics: Arc<MetricsRegistry>,
}

impl CoordState {
    pub fn new(router: DecisionRouter) -> Self {
        let metrics = router.metrics().clone();
        Self {
            router: Arc::new(router),
            metrics,
        }
    }
}

/// Creates the HTTP router with all public endpoints.
pub fn create_router(state: CoordState) -> Router {
    Router::new()
        .route("/", get(handle_query))
        .route("/query", get(handle_query))
        .route("/health/live", get(health_live))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn(request_tracing_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_query(
    State(state): State<CoordState>,
    query: std::result::Result<Query<QueryRequest>, QueryRejection>,
) -> Result<QueryResponse> {
    let Query(request) = query.map_err(|rejection| {
        state.metrics.rejected_queries.inc();
        let err = Error::MalformedQuery(rejection.body_text());
        tracing::warn!(kind = err.kind(), "Query failed: {}", err);
        err
    })?;

    let start = Instant::now();
    let result = state.router.handle(&request).await;

    // Unknown query types share one label to keep metric cardinality bounded
    let label = request
        .query_type
        .as_deref()
        .and_then(|q| q.parse::<QueryType>().ok())
        .map(|q| q.as_str())
        .unwrap_or("invalid");
    match &result {
        Err(e) if e.is_classification() => {}
        _ => state
            .metrics
            .record_query(label, start.elapsed(), result.is_ok()),
    }

    if let Err(e) = &result {
        tracing::warn!(query_type = label, kind = e.kind(), "Query failed: {}", e);
    }
    result
}

/// Liveness probe
async fn health_live() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(json!({
            "alive": true,
            "role": "coordinator",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().timestamp(),
        })),
    )
}

async fn metrics(State(state): State<CoordState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
