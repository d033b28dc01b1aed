//! Coordinator metrics
//!
//! Prometheus-compatible counters and latency histograms for inbound queries
//! (by query type) and outbound fragment site calls (by site).

use crate::common::partition::SiteId;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Histogram bucket boundaries for latency measurements (in milliseconds)
const LATENCY_BUCKETS: [f64; 11] = [
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
];

/// A simple histogram implementation for latency tracking
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    boundaries: Vec<f64>,
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: (0..=LATENCY_BUCKETS.len()).map(|_| AtomicU64::new(0)).collect(),
            boundaries: LATENCY_BUCKETS.to_vec(),
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a value in milliseconds
    pub fn observe(&self, value_ms: f64) {
        let idx = self
            .boundaries
            .iter()
            .position(|&b| value_ms <= b)
            .unwrap_or(self.boundaries.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
        self.sum_micros
            .fetch_add((value_ms * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Cumulative buckets, ending with +Inf
    pub fn get_buckets(&self) -> Vec<(f64, u64)> {
        let mut cumulative = 0u64;
        let mut result = Vec::with_capacity(self.buckets.len());
        for (i, &boundary) in self.boundaries.iter().enumerate() {
            cumulative += self.buckets[i].load(Ordering::Relaxed);
            result.push((boundary, cumulative));
        }
        cumulative += self.buckets[self.boundaries.len()].load(Ordering::Relaxed);
        result.push((f64::INFINITY, cumulative));
        result
    }

    pub fn sum(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1000.0
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Request/outcome counters plus latency for one label
#[derive(Debug, Default)]
pub struct LabelMetrics {
    pub total: Counter,
    pub success: Counter,
    pub error: Counter,
    pub latency: Histogram,
}

impl LabelMetrics {
    fn record(&self, duration: Duration, success: bool) {
        self.total.inc();
        self.latency.observe(duration.as_secs_f64() * 1000.0);
        if success {
            self.success.inc();
        } else {
            self.error.inc();
        }
    }
}

#[derive(Debug)]
pub struct MetricsRegistry {
    queries: Mutex<BTreeMap<String, Arc<LabelMetrics>>>,
    sites: Mutex<BTreeMap<SiteId, Arc<LabelMetrics>>>,
    pub rejected_queries: Counter,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            queries: Mutex::new(BTreeMap::new()),
            sites: Mutex::new(BTreeMap::new()),
            rejected_queries: Counter::default(),
            start_time: Instant::now(),
        }
    }

    pub fn query(&self, query_type: &str) -> Arc<LabelMetrics> {
        let mut queries = self.queries.lock().unwrap_or_else(|e| e.into_inner());
        queries
            .entry(query_type.to_string())
            .or_default()
            .clone()
    }

    pub fn site(&self, site: SiteId) -> Arc<LabelMetrics> {
        let mut sites = self.sites.lock().unwrap_or_else(|e| e.into_inner());
        sites.entry(site).or_default().clone()
    }

    pub fn record_query(&self, query_type: &str, duration: Duration, success: bool) {
        self.query(query_type).record(duration, success);
    }

    pub fn record_site_call(&self, site: SiteId, duration: Duration, success: bool) {
        self.site(site).record(duration, success);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-compatible metrics output
    pub fn to_prometheus(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();

        out.push_str("# HELP minifrag_uptime_seconds Coordinator uptime\n");
        out.push_str("# TYPE minifrag_uptime_seconds gauge\n");
        let _ = writeln!(out, "minifrag_uptime_seconds {}", self.uptime_seconds());

        out.push_str("# HELP minifrag_rejected_queries_total Queries rejected before routing\n");
        out.push_str("# TYPE minifrag_rejected_queries_total counter\n");
        let _ = writeln!(
            out,
            "minifrag_rejected_queries_total {}",
            self.rejected_queries.get()
        );

        let queries: Vec<(String, Arc<LabelMetrics>)> = self
            .queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        write_family(
            &mut out,
            "minifrag_queries",
            "query_type",
            "Inbound queries",
            &queries,
        );

        let sites: Vec<(String, Arc<LabelMetrics>)> = self
            .sites
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        write_family(
            &mut out,
            "minifrag_site_calls",
            "site",
            "Outbound fragment site calls",
            &sites,
        );

        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn write_family(
    out: &mut String,
    name: &str,
    label: &str,
    help: &str,
    entries: &[(String, Arc<LabelMetrics>)],
) {
    use std::fmt::Write;

    let _ = writeln!(out, "# HELP {name}_total {help}");
    let _ = writeln!(out, "# TYPE {name}_total counter");
    for (value, m) in entries {
        let labels = format!("{label}=\"{value}\"");
        let _ = writeln!(
            out,
            "{name}_total{{{labels},outcome=\"success\"}} {}",
            m.success.get()
        );
        let _ = writeln!(
            out,
            "{name}_total{{{labels},outcome=\"error\"}} {}",
            m.error.get()
        );
    }

    let _ = writeln!(out, "# HELP {name}_duration_ms {help} latency");
    let _ = writeln!(out, "# TYPE {name}_duration_ms histogram");
    for (value, m) in entries {
        let labels = format!("{label}=\"{value}\"");
        for (boundary, count) in m.latency.get_buckets() {
            let le = if boundary.is_infinite() {
                "+Inf".to_string()
            } else {
                boundary.to_string()
            };
            let _ = writeln!(out, "{name}_duration_ms_bucket{{{labels},le=\"{le}\"}} {count}");
        }
        let _ = writeln!(out, "{name}_duration_ms_sum{{{labels}}} {}", m.latency.sum());
        let _ = writeln!(out, "{name}_duration_ms_count{{{labels}}} {}", m.latency.count());
    }
}
