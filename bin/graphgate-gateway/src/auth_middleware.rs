//! Authentication middleware for the Graph gateway
//!
//! Requests carrying Basic credentials are resolved against the account
//! directory. Everything else goes to the bearer delegate, which hands the
//! access token to the configured [`ClaimsVerifier`]. On success the request
//! carries either a `ResolvedIdentity` or `Claims` in its extensions.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use graphgate_auth::{
    AccountResolver, ClaimsVerifier, Credentials, ResolvedIdentity, extract_access_token,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::graph::error::unauthorized;
use crate::metrics::graph_metrics;

/// Paths served without authentication
const EXEMPT_PATHS: [&str; 2] = ["/healthz", "/metrics"];

/// Authentication state shared across requests
pub struct AuthState {
    pub resolver: AccountResolver,
    pub verifier: Arc<dyn ClaimsVerifier>,
}

impl AuthState {
    pub fn new(resolver: AccountResolver, verifier: Arc<dyn ClaimsVerifier>) -> Self {
        Self { resolver, verifier }
    }
}

/// Authentication middleware layer
pub async fn auth_layer(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    // A malformed Basic header counts as no Basic credentials at all
    let Ok(credentials) = Credentials::from_headers(request.headers()) else {
        return bearer(auth_state.verifier.as_ref(), request, next).await;
    };

    match auth_state.resolver.resolve_by_credentials(&credentials).await {
        Ok(account) => {
            debug!(
                "Authenticated login {} as account {}",
                credentials.username, account.id
            );
            request
                .extensions_mut()
                .insert(ResolvedIdentity::new(account));
            next.run(request).await
        }
        Err(e) => {
            info!("Basic authentication for {} failed: {}", credentials.username, e);
            reject()
        }
    }
}

/// Bearer delegate: verify the access token and attach its claims
async fn bearer(verifier: &dyn ClaimsVerifier, mut request: Request<Body>, next: Next) -> Response {
    let Some(token) = extract_access_token(request.headers(), request.uri().query()) else {
        debug!("Request to {} carries no credentials", request.uri().path());
        return reject();
    };

    match verifier.verify(&token).await {
        Ok(claims) => {
            debug!("Token verified by {} for sub={}", verifier.name(), claims.subject);
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            info!("Token rejected by {} verifier: {}", verifier.name(), e);
            reject()
        }
    }
}

fn reject() -> Response {
    graph_metrics().record_auth_rejection();
    unauthorized()
}
