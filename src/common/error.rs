//! Error types for minifrag

use crate::common::partition::SiteId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Classification Errors ===
    #[error("Only {supported} department queries are supported (got {requested:?})")]
    UnsupportedDepartment {
        supported: String,
        requested: Option<String>,
    },

    #[error("Invalid query type: {0:?}")]
    InvalidQueryType(Option<String>),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    // === Site Errors ===
    #[error("{site} unreachable: {reason}")]
    SiteUnreachable { site: SiteId, reason: String },

    #[error("{site} did not answer within {after_ms}ms")]
    SiteTimeout { site: SiteId, after_ms: u64 },

    #[error("{site} returned an error: {reason}")]
    SiteError {
        site: SiteId,
        status: Option<u16>,
        reason: String,
    },

    #[error("Could not merge partial result from {site}: {reason}")]
    AggregationFailure { site: SiteId, reason: String },

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Was this error raised before any site was contacted?
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedDepartment { .. }
                | Error::InvalidQueryType(_)
                | Error::MissingParameter(_)
                | Error::InvalidParameter { .. }
                | Error::MalformedQuery(_)
        )
    }

    /// The site this error originated from, if any
    pub fn site(&self) -> Option<SiteId> {
        match self {
            Error::SiteUnreachable { site, .. }
            | Error::SiteTimeout { site, .. }
            | Error::SiteError { site, .. }
            | Error::AggregationFailure { site, .. } => Some(*site),
            _ => None,
        }
    }

    /// Stable tag for error responses and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedDepartment { .. } => "unsupported_department",
            Error::InvalidQueryType(_) => "invalid_query_type",
            Error::MissingParameter(_) => "missing_parameter",
            Error::InvalidParameter { .. } => "invalid_parameter",
            Error::MalformedQuery(_) => "malformed_query",
            Error::SiteUnreachable { .. } => "site_unreachable",
            Error::SiteTimeout { .. } => "site_timeout",
            Error::SiteError { .. } => "site_error",
            Error::AggregationFailure { .. } => "aggregation_failure",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Internal(_) => "internal",
        }
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        if self.is_classification() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "site": self.site(),
        });
        (self.to_http_status(), axum::Json(body)).into_response()
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
