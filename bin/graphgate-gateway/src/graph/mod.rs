//! MS Graph API handlers
//!
//! Routes here are relative to the configured Graph root; the caller nests
//! them under it. Every handler runs behind the authentication gate, which
//! has already attached either a `ResolvedIdentity` or verified `Claims`.

pub mod drive;
pub mod error;
pub mod translate;
pub mod users;

use axum::{Router, middleware, routing::get};
use graphgate_auth::{AccountResolver, ClaimsQuery};
use graphgate_client::{AccountDirectory, StorageGateway};
use std::sync::Arc;

pub use error::ApiError;
pub use users::PathUser;

/// Shared handler state
pub struct GraphState {
    pub resolver: AccountResolver,
    pub directory: Arc<dyn AccountDirectory>,
    pub storage: Arc<dyn StorageGateway>,
}

impl GraphState {
    /// Create handler state; the resolver reads from the same directory
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        storage: Arc<dyn StorageGateway>,
        claims_query: ClaimsQuery,
    ) -> Self {
        Self {
            resolver: AccountResolver::new(directory.clone(), claims_query),
            directory,
            storage,
        }
    }
}

/// Build the Graph routes
pub fn router(state: Arc<GraphState>) -> Router {
    // Only /users/{user_id} loads the path account
    let user_routes = Router::new()
        .route("/users/{user_id}", get(users::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            users::load_user,
        ));

    Router::new()
        .route("/me", get(users::get_me))
        .route("/users", get(users::get_users))
        .route("/drives/root/children", get(drive::get_root_drive_children))
        .route("/me/drive/root/children", get(drive::get_root_drive_children))
        .merge(user_routes)
        .with_state(state)
}
