//! Request deadline for the Graph gateway
//!
//! Runs inside the metrics layer so that requests cut off here are still
//! counted. Dropping the inner future cancels any outstanding backend call.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use graphgate_common::Error;
use std::time::Duration;
use tracing::warn;

use crate::graph::ApiError;

/// Deadline middleware; answers 504 in the Graph error envelope when the
/// request outlives `limit`
pub async fn timeout_layer(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!("Request to {} timed out after {:?}", path, limit);
            ApiError(Error::Timeout {
                after_secs: limit.as_secs(),
            })
            .into_response()
        }
    }
}
