//! Graph API metrics for Prometheus
//!
//! Tracks per-operation request counts, outcome classes and latencies.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Graph operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphOperation {
    GetMe,
    ListUsers,
    GetUser,
    ListRootChildren,
}

impl GraphOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetMe => "GetMe",
            Self::ListUsers => "ListUsers",
            Self::GetUser => "GetUser",
            Self::ListRootChildren => "ListRootChildren",
        }
    }
}

/// Latency histogram boundaries: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms,
/// 500ms, 1s, 5s, 10s
const LATENCY_BUCKET_BOUNDARIES_MS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

/// Per-operation metrics
#[derive(Debug, Default)]
struct OperationMetrics {
    requests_total: AtomicU64,
    /// 2xx
    requests_success: AtomicU64,
    /// 4xx
    requests_client_error: AtomicU64,
    /// 5xx
    requests_server_error: AtomicU64,
    latency_sum_us: AtomicU64,
    /// Non-cumulative counts; made cumulative on export
    latency_buckets: [AtomicU64; 11],
}

impl OperationMetrics {
    fn record(&self, status_code: u16, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if (200..300).contains(&status_code) {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else if (400..500).contains(&status_code) {
            self.requests_client_error.fetch_add(1, Ordering::Relaxed);
        } else if status_code >= 500 {
            self.requests_server_error.fetch_add(1, Ordering::Relaxed);
        }

        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);

        let latency_ms = latency_us / 1000;
        if let Some(i) = LATENCY_BUCKET_BOUNDARIES_MS
            .iter()
            .position(|&boundary| latency_ms <= boundary)
        {
            self.latency_buckets[i].fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Graph metrics collector
#[derive(Debug)]
pub struct GraphMetrics {
    operations: RwLock<HashMap<GraphOperation, OperationMetrics>>,
    /// Requests rejected by the authentication gate
    auth_rejections: AtomicU64,
    start_time: Instant,
}

impl GraphMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operations: RwLock::new(HashMap::new()),
            auth_rejections: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed Graph operation
    pub fn record_operation(&self, op: GraphOperation, status_code: u16, latency_us: u64) {
        if let Some(metrics) = self.operations.read().get(&op) {
            metrics.record(status_code, latency_us);
            return;
        }
        self.operations
            .write()
            .entry(op)
            .or_default()
            .record(status_code, latency_us);
    }

    /// Count a request turned away by the authentication gate
    pub fn record_auth_rejection(&self) {
        self.auth_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus text format
    #[must_use]
    pub fn export_prometheus(&self) -> String {
        let mut output = String::with_capacity(4 * 1024);

        let _ = writeln!(
            output,
            "# HELP graphgate_uptime_seconds Gateway uptime in seconds"
        );
        let _ = writeln!(output, "# TYPE graphgate_uptime_seconds counter");
        let _ = writeln!(
            output,
            "graphgate_uptime_seconds {}",
            self.start_time.elapsed().as_secs()
        );

        let _ = writeln!(
            output,
            "# HELP graphgate_auth_rejections_total Requests rejected by the authentication gate"
        );
        let _ = writeln!(output, "# TYPE graphgate_auth_rejections_total counter");
        let _ = writeln!(
            output,
            "graphgate_auth_rejections_total {}",
            self.auth_rejections.load(Ordering::Relaxed)
        );

        let ops = self.operations.read();
        let mut names: Vec<&GraphOperation> = ops.keys().collect();
        names.sort();

        let _ = writeln!(
            output,
            "# HELP graphgate_requests_total Total Graph requests by operation and status"
        );
        let _ = writeln!(output, "# TYPE graphgate_requests_total counter");
        for op in &names {
            let metrics = &ops[*op];
            for (status, counter) in [
                ("success", &metrics.requests_success),
                ("client_error", &metrics.requests_client_error),
                ("server_error", &metrics.requests_server_error),
            ] {
                let _ = writeln!(
                    output,
                    "graphgate_requests_total{{operation=\"{}\",status=\"{}\"}} {}",
                    op.as_str(),
                    status,
                    counter.load(Ordering::Relaxed)
                );
            }
        }

        let _ = writeln!(
            output,
            "# HELP graphgate_request_duration_seconds Graph request duration histogram"
        );
        let _ = writeln!(output, "# TYPE graphgate_request_duration_seconds histogram");
        for op in &names {
            let metrics = &ops[*op];
            let op_name = op.as_str();
            let total = metrics.requests_total.load(Ordering::Relaxed);
            let sum_us = metrics.latency_sum_us.load(Ordering::Relaxed);

            let mut cumulative = 0u64;
            for (i, &boundary_ms) in LATENCY_BUCKET_BOUNDARIES_MS.iter().enumerate() {
                cumulative += metrics.latency_buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(
                    output,
                    "graphgate_request_duration_seconds_bucket{{operation=\"{}\",le=\"{}\"}} {}",
                    op_name,
                    boundary_ms as f64 / 1000.0,
                    cumulative
                );
            }
            let _ = writeln!(
                output,
                "graphgate_request_duration_seconds_bucket{{operation=\"{op_name}\",le=\"+Inf\"}} {total}"
            );
            let _ = writeln!(
                output,
                "graphgate_request_duration_seconds_sum{{operation=\"{}\"}} {}",
                op_name,
                sum_us as f64 / 1_000_000.0
            );
            let _ = writeln!(
                output,
                "graphgate_request_duration_seconds_count{{operation=\"{op_name}\"}} {total}"
            );
        }

        output
    }
}

impl Default for GraphMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static GRAPH_METRICS: OnceLock<GraphMetrics> = OnceLock::new();

/// Get the global Graph metrics instance
pub fn graph_metrics() -> &'static GraphMetrics {
    GRAPH_METRICS.get_or_init(GraphMetrics::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation() {
        let metrics = GraphMetrics::new();
        metrics.record_operation(GraphOperation::GetMe, 200, 800);
        metrics.record_operation(GraphOperation::GetMe, 404, 2_000);
        metrics.record_operation(GraphOperation::ListRootChildren, 500, 20_000_000);

        let output = metrics.export_prometheus();
        assert!(output.contains("graphgate_requests_total{operation=\"GetMe\",status=\"success\"} 1"));
        assert!(output.contains("graphgate_requests_total{operation=\"GetMe\",status=\"client_error\"} 1"));
        assert!(output.contains(
            "graphgate_requests_total{operation=\"ListRootChildren\",status=\"server_error\"} 1"
        ));
        assert!(output.contains("graphgate_request_duration_seconds_count{operation=\"GetMe\"} 2"));
    }

    #[test]
    fn test_histogram_is_cumulative() {
        let metrics = GraphMetrics::new();
        metrics.record_operation(GraphOperation::GetUser, 200, 500);
        metrics.record_operation(GraphOperation::GetUser, 200, 7_000);

        let output = metrics.export_prometheus();
        assert!(output.contains(
            "graphgate_request_duration_seconds_bucket{operation=\"GetUser\",le=\"0.001\"} 1"
        ));
        assert!(output.contains(
            "graphgate_request_duration_seconds_bucket{operation=\"GetUser\",le=\"0.01\"} 2"
        ));
        assert!(output.contains(
            "graphgate_request_duration_seconds_bucket{operation=\"GetUser\",le=\"+Inf\"} 2"
        ));
    }

    #[test]
    fn test_auth_rejections() {
        let metrics = GraphMetrics::new();
        metrics.record_auth_rejection();
        metrics.record_auth_rejection();
        assert!(metrics.export_prometheus().contains("graphgate_auth_rejections_total 2"));
    }
}
