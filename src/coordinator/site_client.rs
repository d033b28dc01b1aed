//! Fragment site client
//!
//! [`FragmentClient`] is the seam between the router and the network. The
//! HTTP implementation makes exactly one attempt per call; retries or circuit
//! breaking belong in a wrapper implementing the same trait.

use crate::common::config::SiteEndpoints;
use crate::common::partition::SiteId;
use crate::common::tracing_middleware::{current_request_id, REQUEST_ID_HEADER};
use crate::coordinator::classifier::SiteQuery;
use crate::{Error, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use std::time::Duration;

/// Longest error body excerpt carried into a `SiteError`
const ERROR_BODY_EXCERPT: usize = 256;

#[async_trait]
pub trait FragmentClient: Send + Sync {
    /// Run one query against one site and return the raw success body.
    async fn fetch(&self, site: SiteId, query: &SiteQuery) -> Result<Bytes>;
}

pub struct HttpSiteClient {
    http: reqwest::Client,
    endpoints: SiteEndpoints,
    timeout: Duration,
}

impl HttpSiteClient {
    pub fn new(endpoints: SiteEndpoints, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoints,
            timeout,
        })
    }

    pub fn url(&self, site: SiteId, query: &SiteQuery) -> String {
        format!(
            "{}{}",
            self.endpoints.base_url(site).trim_end_matches('/'),
            query.path()
        )
    }

    fn transport_error(&self, site: SiteId, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::SiteTimeout {
                site,
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            Error::SiteUnreachable {
                site,
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl FragmentClient for HttpSiteClient {
    async fn fetch(&self, site: SiteId, query: &SiteQuery) -> Result<Bytes> {
        let url = self.url(site, query);
        tracing::debug!(%site, %url, "Calling fragment site");

        let mut request = self.http.get(&url).query(&query.params());
        if let Some(id) = current_request_id() {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(site, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(site, e))?;

        if !status.is_success() {
            let excerpt: String = String::from_utf8_lossy(&body)
                .chars()
                .take(ERROR_BODY_EXCERPT)
                .collect();
            return Err(Error::SiteError {
                site,
                status: Some(status.as_u16()),
                reason: format!("HTTP {}: {}", status.as_u16(), excerpt),
            });
        }

        Ok(body)
    }
}
