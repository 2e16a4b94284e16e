//! Metrics middleware for automatic Graph operation tracking
//!
//! Intercepts all requests and records metrics based on HTTP method and the
//! trailing path segments, so the configured route prefix does not matter.

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{GraphOperation, graph_metrics};

/// Extract the Graph operation from HTTP method and path
fn extract_operation(method: &Method, path: &str) -> Option<GraphOperation> {
    if method != Method::GET {
        return None;
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [.., "drives", "root", "children"] | [.., "me", "drive", "root", "children"] => {
            Some(GraphOperation::ListRootChildren)
        }
        [.., "users", _user_id] => Some(GraphOperation::GetUser),
        [.., "users"] => Some(GraphOperation::ListUsers),
        [.., "me"] => Some(GraphOperation::GetMe),
        // Health, metrics and unknown routes
        _ => None,
    }
}

/// Metrics middleware that records Graph operation metrics
pub async fn metrics_layer(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let operation = extract_operation(request.method(), request.uri().path());

    let response = next.run(request).await;

    if let Some(op) = operation {
        let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        graph_metrics().record_operation(op, response.status().as_u16(), latency_us);
    }

    response
}
