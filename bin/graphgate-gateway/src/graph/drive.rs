//! Drive handlers

use axum::{
    Json,
    extract::{RawQuery, State},
    http::HeaderMap,
};
use graphgate_auth::extract_access_token;
use std::sync::Arc;
use tracing::{debug, error};

use super::GraphState;
use super::error::ApiError;
use super::translate::{Collection, DriveItem, translate_items};

const ROOT_PATH: &str = "/";

/// GET /drives/root/children and GET /me/drive/root/children
///
/// Returns the root item followed by its direct children in backend order.
/// The caller's access token is forwarded to the storage gateway.
pub async fn get_root_drive_children(
    State(state): State<Arc<GraphState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<Collection<DriveItem>>, ApiError> {
    let token = extract_access_token(&headers, query.as_deref());
    if token.is_none() {
        debug!("No access token to forward to the storage gateway");
    }

    let root = state
        .storage
        .stat(token.as_deref(), ROOT_PATH)
        .await
        .inspect_err(|e| error!("Failed to stat {}: {}", ROOT_PATH, e))?;

    let mut items = Vec::new();
    let is_container = root.is_container();
    items.push(root);
    if is_container {
        let children = state
            .storage
            .list_container(token.as_deref(), ROOT_PATH)
            .await
            .inspect_err(|e| error!("Failed to list container {}: {}", ROOT_PATH, e))?;
        items.extend(children);
    }

    Ok(Json(Collection::new(translate_items(&items)?)))
}
