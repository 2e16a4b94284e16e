//! Core data types shared across the gateway
//!
//! These are the backend-neutral shapes: the clients convert wire messages
//! into them and the gateway translates them into public API items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user account as held by the account directory.
///
/// The id is the stable identifier and is never empty; clients reject
/// backend records without one before constructing this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Stable account id
    pub id: String,
    /// Display name
    pub display_name: Option<String>,
    /// Primary email address
    pub mail: Option<String>,
    /// Given (first) name
    pub given_name: Option<String>,
    /// Family name
    pub surname: Option<String>,
    /// Preferred (login-ish) name
    pub preferred_name: Option<String>,
}

impl AccountRecord {
    /// Create a record with only the id set
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set display name
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set email
    #[must_use]
    pub fn with_mail(mut self, mail: impl Into<String>) -> Self {
        self.mail = Some(mail.into());
        self
    }
}

/// Parameters of a directory list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuery {
    /// Backend filter expression, empty for "all accounts"
    pub filter: String,
    /// Maximum number of records to return (0 = backend default)
    pub page_size: i32,
    /// Opaque continuation token from a previous page
    pub page_token: String,
}

impl AccountQuery {
    /// Query with a filter and page size
    pub fn filtered(filter: impl Into<String>, page_size: i32) -> Self {
        Self {
            filter: filter.into(),
            page_size,
            page_token: String::new(),
        }
    }
}

/// One page of a directory list call, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPage {
    pub accounts: Vec<AccountRecord>,
    /// Continuation token; empty when this is the last page
    pub next_page_token: String,
}

/// Kind of a storage resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    File,
    Container,
    /// A type code the gateway has no public representation for
    Unrecognized(i32),
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Container => write!(f, "container"),
            Self::Unrecognized(code) => write!(f, "unrecognized({code})"),
        }
    }
}

/// Resource metadata as reported by the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    /// Opaque backend resource id (may be empty)
    pub id: String,
    /// Absolute path, `/` for the root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    pub kind: ResourceKind,
    pub etag: Option<String>,
    pub mime_type: Option<String>,
    /// Modification time in seconds since the epoch
    pub mtime: Option<u64>,
}

impl StorageItem {
    /// Create an item with path, kind and size; optional fields unset
    pub fn new(path: impl Into<String>, kind: ResourceKind, size: u64) -> Self {
        Self {
            id: String::new(),
            path: path.into(),
            size,
            kind,
            etag: None,
            mime_type: None,
            mtime: None,
        }
    }

    /// Check if this item is a container
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind == ResourceKind::Container
    }
}
