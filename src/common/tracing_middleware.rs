//! Request ID propagation and request logging
//!
//! Every inbound request gets an `X-Request-ID` (honored if the caller sent
//! one). The id is echoed on the response, attached to the request span and
//! kept in a task-local for the duration of the handler, so the coordinator
//! can forward it on its fragment site calls and one query can be followed
//! across all three processes.

use axum::{
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Request id of the inbound request being handled by this task
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(|id| id.clone()).ok()
}

pub async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        query = request.uri().query().unwrap_or(""),
    );

    let mut response = CURRENT_REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .instrument(span.clone())
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    span.in_scope(|| {
        if response.status().is_server_error() {
            tracing::warn!(status, elapsed_ms, "Request failed");
        } else {
            tracing::info!(status, elapsed_ms, "Request completed");
        }
    });

    response
}
