//! graphgate gateway - MS Graph API over the account directory and storage
//!
//! [`app`] assembles the full HTTP surface: the Graph routes under the
//! configured root, `/healthz`, `/metrics`, and the middleware stack.

pub mod auth_middleware;
pub mod graph;
pub mod metrics;
pub mod metrics_middleware;
pub mod timeout_middleware;

#[cfg(test)]
mod test_support;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::get,
};
use graphgate_common::config::HttpConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use auth_middleware::{AuthState, auth_layer};
use graph::GraphState;
use metrics::graph_metrics;

/// Response header announcing the gateway version
const VERSION_HEADER: HeaderName = HeaderName::from_static("x-graph-version");

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        graph_metrics().export_prometheus(),
    )
}

async fn health_check() -> &'static str {
    "ok"
}

/// Normalize the Graph root: `None` when routes are served at the top level,
/// otherwise a path with a leading and no trailing slash.
fn graph_root(root: &str) -> Option<String> {
    let trimmed = root.trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

/// Build the gateway router
pub fn app(state: Arc<GraphState>, auth_state: Arc<AuthState>, http: &HttpConfig) -> Router {
    let graph_routes = graph::router(state);
    let router = match graph_root(&http.root) {
        Some(root) => Router::new().nest(&root, graph_routes),
        None => Router::new().merge(graph_routes),
    };

    router
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(auth_state, auth_layer))
        .layer(middleware::from_fn_with_state(
            Duration::from_secs(http.request_timeout_secs),
            timeout_middleware::timeout_layer,
        ))
        .layer(middleware::from_fn(metrics_middleware::metrics_layer))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            VERSION_HEADER,
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_root() {
        assert_eq!(graph_root("/graph/v1.0").as_deref(), Some("/graph/v1.0"));
        assert_eq!(graph_root("graph/v1.0/").as_deref(), Some("/graph/v1.0"));
        assert_eq!(graph_root("/"), None);
        assert_eq!(graph_root(""), None);
    }
}
