//! User handlers: `/me`, `/users`, `/users/{user_id}`

use axum::{
    Extension, Json,
    extract::{Path, Query, Request, State, rejection::QueryRejection},
    middleware::Next,
    response::Response,
};
use graphgate_auth::{Claims, ResolvedIdentity};
use graphgate_common::{AccountQuery, AccountRecord, Error};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::GraphState;
use super::error::ApiError;
use super::translate::{Collection, User, user_from_account};

/// Account addressed by the request path, as opposed to the caller's own
/// `ResolvedIdentity`
#[derive(Debug, Clone)]
pub struct PathUser(pub AccountRecord);

/// Query options of `GET /users`. Each option is accepted with and without
/// the OData `$` prefix; the bare name wins when both are non-empty.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    top: Option<String>,
    #[serde(rename = "$top")]
    dollar_top: Option<String>,
    filter: Option<String>,
    #[serde(rename = "$filter")]
    dollar_filter: Option<String>,
    page_token: Option<String>,
}

fn first_non_empty<'a>(bare: Option<&'a str>, prefixed: Option<&'a str>) -> Option<&'a str> {
    bare.filter(|s| !s.is_empty())
        .or_else(|| prefixed.filter(|s| !s.is_empty()))
}

impl ListUsersParams {
    fn top(&self) -> Option<&str> {
        first_non_empty(self.top.as_deref(), self.dollar_top.as_deref())
    }

    fn filter(&self) -> &str {
        first_non_empty(self.filter.as_deref(), self.dollar_filter.as_deref()).unwrap_or_default()
    }

    fn page_token(&self) -> &str {
        self.page_token.as_deref().unwrap_or_default()
    }

    /// Page size for the directory call, 0 when not requested
    fn page_size(&self) -> graphgate_common::Result<i32> {
        let Some(top) = self.top() else {
            return Ok(0);
        };
        match top.parse::<i32>() {
            Ok(size) if size >= 0 => Ok(size),
            _ => Err(Error::invalid_request(format!("invalid top value: {top}"))),
        }
    }

    fn to_query(&self) -> graphgate_common::Result<AccountQuery> {
        Ok(AccountQuery {
            filter: self.filter().to_string(),
            page_size: self.page_size()?,
            page_token: self.page_token().to_string(),
        })
    }

    /// Relative link to the page after this one
    fn next_link(&self, next_page_token: &str) -> String {
        let mut link = format!("users?page_token={}", urlencoding::encode(next_page_token));
        if let Some(top) = self.top() {
            link.push_str("&$top=");
            link.push_str(&urlencoding::encode(top));
        }
        let filter = self.filter();
        if !filter.is_empty() {
            link.push_str("&$filter=");
            link.push_str(&urlencoding::encode(filter));
        }
        link
    }
}

/// GET /me
pub async fn get_me(
    State(state): State<Arc<GraphState>>,
    identity: Option<Extension<ResolvedIdentity>>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<User>, ApiError> {
    let account = state
        .resolver
        .resolve_by_context_or_claims(identity.as_deref(), claims.as_deref())
        .await?;

    Ok(Json(user_from_account(account)))
}

/// GET /users
pub async fn get_users(
    State(state): State<Arc<GraphState>>,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<Json<Collection<User>>, ApiError> {
    let Query(params) = params.map_err(|e| Error::invalid_request(e.body_text()))?;
    let query = params.to_query().inspect_err(|e| info!("Failed to parse top: {}", e))?;

    let page = state
        .directory
        .list_accounts(&query)
        .await
        .inspect_err(|e| info!("Failed to list accounts: {}", e))?;
    debug!(
        "Listed {} accounts (filter: {:?})",
        page.accounts.len(),
        query.filter
    );

    let mut body = Collection::new(page.accounts.into_iter().map(user_from_account).collect());
    if !page.next_page_token.is_empty() {
        body.next_link = Some(params.next_link(&page.next_page_token));
    }
    Ok(Json(body))
}

/// Route middleware for `/users/{user_id}`: loads the addressed account and
/// attaches it as [`PathUser`]. Unknown ids stop the request with 404.
pub async fn load_user(
    State(state): State<Arc<GraphState>>,
    Path(user_id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = state.resolver.resolve_by_id(&user_id).await?;
    request.extensions_mut().insert(PathUser(account));
    Ok(next.run(request).await)
}

/// GET /users/{user_id}
pub async fn get_user(Extension(PathUser(account)): Extension<PathUser>) -> Json<User> {
    Json(user_from_account(account))
}
