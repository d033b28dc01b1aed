//! Decision router
//!
//! Executes routing plans against the fragment sites. Every site call is
//! bounded by the configured timeout. Scatter-gather calls run concurrently
//! and the whole request fails if either site fails; partial results are
//! never returned.

use crate::common::metrics::MetricsRegistry;
use crate::common::partition::SiteId;
use crate::common::CoordinatorConfig;
use crate::coordinator::aggregator;
use crate::coordinator::classifier::{Classifier, QueryRequest, RoutingPlan, SiteQuery};
use crate::coordinator::site_client::{FragmentClient, HttpSiteClient};
use crate::{Error, Result};
use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Successful answer to an inbound query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Body of a single-site call, unchanged
    PassThrough(Bytes),
    /// Concatenated rows of a scatter-gather call
    Merged(Vec<Value>),
}

impl IntoResponse for QueryResponse {
    fn into_response(self) -> Response {
        match self {
            QueryResponse::PassThrough(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            QueryResponse::Merged(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        }
    }
}

pub struct DecisionRouter {
    classifier: Classifier,
    client: Arc<dyn FragmentClient>,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl DecisionRouter {
    pub fn new(config: &CoordinatorConfig, client: Arc<dyn FragmentClient>) -> Self {
        Self {
            classifier: Classifier::new(config.department.clone()),
            client,
            timeout: config.request_timeout(),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Router talking HTTP to the sites named in `config`
    pub fn from_config(config: &CoordinatorConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpSiteClient::new(config.sites.clone(), config.request_timeout())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify and execute one inbound query.
    pub async fn handle(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let plan = self.classifier.classify(request);
        tracing::debug!(?plan, "Classified query");
        self.execute(plan).await
    }

    pub async fn execute(&self, plan: RoutingPlan) -> Result<QueryResponse> {
        match plan {
            RoutingPlan::Reject(rejection) => {
                self.metrics.rejected_queries.inc();
                Err(rejection.into_error(self.classifier.department()))
            }
            RoutingPlan::Single { site, query } => {
                let body = self.call(site, &query).await?;
                if let Err(e) = serde_json::from_slice::<serde::de::IgnoredAny>(&body) {
                    return Err(Error::SiteError {
                        site,
                        status: None,
                        reason: format!("malformed response body: {}", e),
                    });
                }
                Ok(QueryResponse::PassThrough(body))
            }
            RoutingPlan::ScatterGather { query } => {
                let (a, b) = tokio::try_join!(
                    self.call(SiteId::SiteA, &query),
                    self.call(SiteId::SiteB, &query)
                )?;
                let rows = aggregator::gather(&a, &b)?;
                tracing::debug!(rows = rows.len(), path = query.path(), "Merged partial results");
                Ok(QueryResponse::Merged(rows))
            }
        }
    }

    async fn call(&self, site: SiteId, query: &SiteQuery) -> Result<Bytes> {
        let start = Instant::now();
        let fetch = self.client.fetch(site, query);
        let result = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(Error::SiteTimeout {
                site,
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        let elapsed = start.elapsed();
        self.metrics.record_site_call(site, elapsed, result.is_ok());
        match &result {
            Ok(body) => tracing::debug!(
                %site,
                path = query.path(),
                bytes = body.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Site call completed"
            ),
            Err(e) => tracing::warn!(
                %site,
                path = query.path(),
                kind = e.kind(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Site call failed: {}",
                e
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::classifier::QueryType;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Body(&'static str),
        Unreachable,
        Status(u16),
    }

    /// In-process site double recording every call
    struct MockSites {
        replies: HashMap<SiteId, (Reply, Duration)>,
        calls: Mutex<Vec<(SiteId, SiteQuery)>>,
    }

    impl MockSites {
        fn new(a: Reply, b: Reply) -> Self {
            Self::with_delays(a, Duration::ZERO, b, Duration::ZERO)
        }

        fn with_delays(a: Reply, delay_a: Duration, b: Reply, delay_b: Duration) -> Self {
            let mut replies = HashMap::new();
            replies.insert(SiteId::SiteA, (a, delay_a));
            replies.insert(SiteId::SiteB, (b, delay_b));
            Self {
                replies,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(SiteId, SiteQuery)> {
            self.calls.lock().unwrap().clone()
        }

        fn calls_to(&self, site: SiteId) -> usize {
            self.calls().iter().filter(|(s, _)| *s == site).count()
        }
    }

    #[async_trait]
    impl FragmentClient for MockSites {
        async fn fetch(&self, site: SiteId, query: &SiteQuery) -> Result<Bytes> {
            self.calls.lock().unwrap().push((site, query.clone()));
            let (reply, delay) = self.replies[&site].clone();
            tokio::time::sleep(delay).await;
            match reply {
                Reply::Body(body) => Ok(Bytes::from_static(body.as_bytes())),
                Reply::Unreachable => Err(Error::SiteUnreachable {
                    site,
                    reason: "connection refused".into(),
                }),
                Reply::Status(code) => Err(Error::SiteError {
                    site,
                    status: Some(code),
                    reason: format!("HTTP {}", code),
                }),
            }
        }
    }

    fn router(sites: Arc<MockSites>) -> DecisionRouter {
        DecisionRouter::new(&CoordinatorConfig::default(), sites)
    }

    fn request(query_type: &str) -> QueryRequest {
        QueryRequest {
            department: Some("CS".into()),
            query_type: Some(query_type.into()),
            course_id: Some("10".into()),
            faculty_id: Some("7".into()),
            ..Default::default()
        }
    }

    const ROWS_A: &str = r#"[{"s_id": 1}, {"s_id": 2}]"#;
    const ROWS_B: &str = r#"[{"s_id": 3}]"#;

    #[tokio::test]
    async fn test_rejections_make_no_calls() {
        let sites = Arc::new(MockSites::new(Reply::Body("[]"), Reply::Body("[]")));
        let router = router(sites.clone());

        for q in QueryType::ALL.map(|q| q.as_str()) {
            let mut req = request(q);
            req.department = Some("EE".into());
            let err = router.handle(&req).await.unwrap_err();
            assert!(matches!(err, Error::UnsupportedDepartment { .. }), "{q}");
        }

        let err = router.handle(&request("bogus")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQueryType(_)));
        assert_eq!(err.to_http_status(), StatusCode::BAD_REQUEST);

        assert!(sites.calls().is_empty());
        assert_eq!(router.metrics().rejected_queries.get(), 5);
    }

    #[tokio::test]
    async fn test_malformed_inputs_make_no_calls() {
        let sites = Arc::new(MockSites::new(Reply::Body("[]"), Reply::Body("[]")));
        let router = router(sites.clone());

        let mut req = request("course_enrollment_details");
        req.course_id = Some("abc".into());
        let err = router.handle(&req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "courseId", .. }));
        assert_eq!(err.to_http_status(), StatusCode::BAD_REQUEST);

        let mut req = request("course_enrollments");
        req.credits = Some("3.5".into());
        let err = router.handle(&req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "credits", .. }));

        assert!(sites.calls().is_empty());
    }

    #[tokio::test]
    async fn test_course_count_routes_by_credits() {
        let body = r#"{"enrollment_count": 4}"#;

        let sites = Arc::new(MockSites::new(Reply::Body(body), Reply::Body(body)));
        let mut req = request("course_enrollments");
        req.credits = Some("3".into());
        let resp = router(sites.clone()).handle(&req).await.unwrap();
        assert_eq!(
            resp,
            QueryResponse::PassThrough(Bytes::from_static(body.as_bytes()))
        );
        assert_eq!(
            sites.calls(),
            vec![(
                SiteId::SiteA,
                SiteQuery::CourseEnrollments { course_id: 10 }
            )]
        );

        for credits in [None, Some("0"), Some("2")] {
            let sites = Arc::new(MockSites::new(Reply::Body(body), Reply::Body(body)));
            let mut req = request("course_enrollments");
            req.credits = credits.map(String::from);
            router(sites.clone()).handle(&req).await.unwrap();
            assert_eq!(sites.calls_to(SiteId::SiteA), 0, "credits={credits:?}");
            assert_eq!(sites.calls_to(SiteId::SiteB), 1, "credits={credits:?}");
        }
    }

    #[tokio::test]
    async fn test_scatter_gather_calls_each_site_once() {
        for q in ["course_enrollment_details", "faculty_students"] {
            let sites = Arc::new(MockSites::new(Reply::Body(ROWS_A), Reply::Body(ROWS_B)));
            router(sites.clone()).handle(&request(q)).await.unwrap();
            assert_eq!(sites.calls_to(SiteId::SiteA), 1, "{q}");
            assert_eq!(sites.calls_to(SiteId::SiteB), 1, "{q}");
        }
    }

    #[tokio::test]
    async fn test_scatter_gather_runs_concurrently() {
        let delay = Duration::from_millis(200);
        let sites = Arc::new(MockSites::with_delays(
            Reply::Body(ROWS_A),
            delay,
            Reply::Body(ROWS_B),
            delay,
        ));
        let start = Instant::now();
        router(sites).handle(&request("faculty_students")).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "took {:?}, calls were sequential", elapsed);
    }

    #[tokio::test]
    async fn test_merge_order_ignores_arrival_order() {
        let expected = QueryResponse::Merged(vec![
            json!({"s_id": 1}),
            json!({"s_id": 2}),
            json!({"s_id": 3}),
        ]);

        let slow_a = Arc::new(MockSites::with_delays(
            Reply::Body(ROWS_A),
            Duration::from_millis(80),
            Reply::Body(ROWS_B),
            Duration::ZERO,
        ));
        let slow_b = Arc::new(MockSites::with_delays(
            Reply::Body(ROWS_A),
            Duration::ZERO,
            Reply::Body(ROWS_B),
            Duration::from_millis(80),
        ));

        let req = request("faculty_students");
        assert_eq!(router(slow_a).handle(&req).await.unwrap(), expected);
        assert_eq!(router(slow_b).handle(&req).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_single_site_failures_are_surfaced() {
        let sites = Arc::new(MockSites::new(Reply::Unreachable, Reply::Status(503)));
        let router = router(sites);

        let err = router.handle(&request("faculty_members")).await.unwrap_err();
        assert!(matches!(err, Error::SiteUnreachable { site: SiteId::SiteA, .. }));
        assert_eq!(err.to_http_status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = router.handle(&request("course_enrollments")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SiteError {
                site: SiteId::SiteB,
                status: Some(503),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_single_body_is_site_error() {
        let sites = Arc::new(MockSites::new(Reply::Body("not json"), Reply::Body("[]")));
        let err = router(sites)
            .handle(&request("faculty_members"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SiteError { status: None, .. }));
    }

    #[tokio::test]
    async fn test_one_failed_site_fails_the_whole_scatter_gather() {
        let sites = Arc::new(MockSites::new(Reply::Body(ROWS_A), Reply::Unreachable));
        let err = router(sites)
            .handle(&request("course_enrollment_details"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SiteUnreachable { site: SiteId::SiteB, .. }));

        let sites = Arc::new(MockSites::new(Reply::Body(ROWS_A), Reply::Body("{}")));
        let err = router(sites)
            .handle(&request("course_enrollment_details"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AggregationFailure { site: SiteId::SiteB, .. }));
    }

    #[tokio::test]
    async fn test_slow_site_times_out() {
        let sites = Arc::new(MockSites::with_delays(
            Reply::Body(ROWS_A),
            Duration::ZERO,
            Reply::Body(ROWS_B),
            Duration::from_secs(5),
        ));
        let config = CoordinatorConfig {
            request_timeout_ms: 50,
            ..Default::default()
        };
        let router = DecisionRouter::new(&config, sites);

        let start = Instant::now();
        let err = router.handle(&request("faculty_students")).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(matches!(
            err,
            Error::SiteTimeout {
                site: SiteId::SiteB,
                after_ms: 50
            }
        ));
    }
}
