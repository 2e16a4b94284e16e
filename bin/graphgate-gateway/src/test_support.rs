//! In-memory backends and request helpers for router tests

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use graphgate_auth::{AuthProviderError, Claims, ClaimsQuery, ClaimsVerifier};
use graphgate_client::{AccountDirectory, StorageGateway};
use graphgate_common::config::HttpConfig;
use graphgate_common::{
    AccountPage, AccountQuery, AccountRecord, Error, ResourceKind, Result, RpcDomain, StorageItem,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::app;
use crate::auth_middleware::AuthState;
use crate::graph::GraphState;

pub const EINSTEIN_LOGIN: &str = "login eq 'einstein' and password eq 'relativity'";

pub fn einstein() -> AccountRecord {
    AccountRecord::with_id("4c510ada")
        .with_display_name("Albert Einstein")
        .with_mail("einstein@example.org")
}

pub fn marie() -> AccountRecord {
    AccountRecord::with_id("f7fbf8c8")
        .with_display_name("Marie Curie")
        .with_mail("marie@example.org")
}

fn outage(domain: RpcDomain) -> Error {
    Error::from_rpc(domain, tonic::Code::Unavailable, "connection refused", "")
}

/// Directory answering filtered lists from a table and unfiltered lists
/// from the full account set
#[derive(Default)]
pub struct FakeDirectory {
    accounts: Vec<AccountRecord>,
    by_filter: HashMap<String, Vec<AccountRecord>>,
    next_page_token: String,
    unavailable: bool,
    pub queries: Mutex<Vec<AccountQuery>>,
}

impl FakeDirectory {
    pub fn with_accounts(accounts: Vec<AccountRecord>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: &str, accounts: Vec<AccountRecord>) -> Self {
        self.by_filter.insert(filter.to_string(), accounts);
        self
    }

    #[must_use]
    pub fn with_next_page_token(mut self, token: &str) -> Self {
        self.next_page_token = token.to_string();
        self
    }
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    async fn get_account(&self, id: &str) -> Result<AccountRecord> {
        if self.unavailable {
            return Err(outage(RpcDomain::Directory));
        }
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    async fn list_accounts(&self, query: &AccountQuery) -> Result<AccountPage> {
        self.queries.lock().push(query.clone());
        if self.unavailable {
            return Err(outage(RpcDomain::Directory));
        }

        let mut accounts = if query.filter.is_empty() {
            self.accounts.clone()
        } else {
            self.by_filter.get(&query.filter).cloned().unwrap_or_default()
        };
        if let Ok(limit) = usize::try_from(query.page_size) {
            if limit > 0 {
                accounts.truncate(limit);
            }
        }

        Ok(AccountPage {
            accounts,
            next_page_token: self.next_page_token.clone(),
        })
    }
}

/// Storage with a fixed root and child listing
#[derive(Default)]
pub struct FakeStorage {
    root: Option<StorageItem>,
    children: Vec<StorageItem>,
    list_fails: bool,
    stalls: bool,
    /// `(operation, forwarded token)` in call order
    pub calls: Mutex<Vec<(&'static str, Option<String>)>>,
}

impl FakeStorage {
    pub fn with_root(root: StorageItem, children: Vec<StorageItem>) -> Self {
        Self {
            root: Some(root),
            children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Stat never answers within any reasonable deadline
    #[must_use]
    pub fn stalling(mut self) -> Self {
        self.stalls = true;
        self
    }
}

#[async_trait]
impl StorageGateway for FakeStorage {
    async fn stat(&self, access_token: Option<&str>, path: &str) -> Result<StorageItem> {
        self.calls.lock().push(("stat", access_token.map(ToString::to_string)));
        if self.stalls {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.root
            .clone()
            .filter(|root| root.path == path)
            .ok_or_else(|| Error::ResourceNotFound(path.to_string()))
    }

    async fn list_container(
        &self,
        access_token: Option<&str>,
        _path: &str,
    ) -> Result<Vec<StorageItem>> {
        self.calls.lock().push(("list", access_token.map(ToString::to_string)));
        if self.list_fails {
            return Err(outage(RpcDomain::Storage));
        }
        Ok(self.children.clone())
    }
}

/// Verifier accepting a fixed set of tokens
#[derive(Default)]
pub struct FakeVerifier {
    tokens: HashMap<String, Claims>,
}

impl FakeVerifier {
    #[must_use]
    pub fn with_token(mut self, token: &str, claims: Claims) -> Self {
        self.tokens.insert(token.to_string(), claims);
        self
    }
}

#[async_trait]
impl ClaimsVerifier for FakeVerifier {
    fn name(&self) -> &str {
        "fake"
    }

    async fn verify(&self, token: &str) -> std::result::Result<Claims, AuthProviderError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthProviderError::InvalidToken)
    }
}

/// A root container with one folder and one file
pub fn sample_tree() -> FakeStorage {
    let mut file = StorageItem::new("/notes.txt", ResourceKind::File, 11);
    file.mime_type = Some("text/plain".to_string());
    FakeStorage::with_root(
        StorageItem::new("/", ResourceKind::Container, 4096),
        vec![
            StorageItem::new("/Documents", ResourceKind::Container, 0),
            file,
        ],
    )
}

/// The assembled gateway plus handles on its fakes
pub struct Harness {
    pub router: Router,
    pub directory: Arc<FakeDirectory>,
    pub storage: Arc<FakeStorage>,
}

impl Harness {
    pub fn new(directory: FakeDirectory, storage: FakeStorage, verifier: FakeVerifier) -> Self {
        Self::with_http(directory, storage, verifier, &HttpConfig::default())
    }

    pub fn with_http(
        directory: FakeDirectory,
        storage: FakeStorage,
        verifier: FakeVerifier,
        http: &HttpConfig,
    ) -> Self {
        let directory = Arc::new(directory);
        let storage = Arc::new(storage);
        let state = Arc::new(GraphState::new(
            directory.clone(),
            storage.clone(),
            ClaimsQuery::default(),
        ));
        let auth_state = Arc::new(AuthState::new(
            state.resolver.clone(),
            Arc::new(verifier),
        ));
        let router = app(state, auth_state, http);

        Self {
            router,
            directory,
            storage,
        }
    }

    /// Send a GET request with an optional `Authorization` header
    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

pub fn einstein_basic() -> String {
    basic("einstein", "relativity")
}
