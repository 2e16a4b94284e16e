//! graphgate authentication and identity resolution
//!
//! This crate provides:
//! - Basic credential and access token extraction from HTTP requests
//! - The `ClaimsVerifier` seam for bearer-token verification
//! - `AccountResolver`, which turns credentials, claims or an id into exactly
//!   one directory account
//!
//! # Example
//!
//! ```rust,ignore
//! use graphgate_auth::{AccountResolver, ClaimsQuery};
//! use std::sync::Arc;
//!
//! let resolver = AccountResolver::new(Arc::new(directory), ClaimsQuery::default());
//! let account = resolver.resolve_by_credentials(&credentials).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod identity;
pub mod provider;
pub mod query;
pub mod resolver;
pub mod token;

pub use credentials::Credentials;
pub use error::AuthError;
pub use identity::ResolvedIdentity;
pub use provider::{AuthProviderError, Claims, ClaimsVerifier, RejectingVerifier};
pub use query::ClaimsQuery;
pub use resolver::AccountResolver;
pub use token::extract_access_token;
