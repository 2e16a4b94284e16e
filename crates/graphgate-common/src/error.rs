//! Error types for graphgate
//!
//! Every failure a handler can produce funnels into [`Error`], which maps
//! deterministically onto an HTTP status and a Graph vendor error code.
//! Backend RPC statuses enter through [`Error::from_rpc`], which needs to
//! know which backend produced the status since "not found" means a missing
//! account in one domain and a missing resource in the other.

use thiserror::Error;

/// Common result type for graphgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// The backend a status code came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcDomain {
    /// Account directory service
    Directory,
    /// Storage gateway service
    Storage,
}

/// Common error type for graphgate
#[derive(Debug, Error)]
pub enum Error {
    // Authentication
    #[error("authentication required")]
    Unauthenticated,

    // Identity resolution
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("more than one account matches {query}: {first_id}, {second_id}")]
    AmbiguousIdentity {
        query: String,
        first_id: String,
        second_id: String,
    },

    // Request validation
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // Storage
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    // Translation
    #[error("size {size} of {path} does not fit a signed 64-bit integer")]
    SizeOverflow { path: String, size: u64 },

    #[error("timestamp {seconds} of {path} is out of range")]
    TimestampOverflow { path: String, seconds: u64 },

    #[error("resource {path} has unrecognized type code {code}")]
    UnrecognizedResourceKind { path: String, code: i32 },

    // Request deadline
    #[error("request did not complete within {after_secs}s")]
    Timeout { after_secs: u64 },

    // Backend
    #[error("{domain:?} backend error ({code:?}): {message}")]
    Backend {
        domain: RpcDomain,
        code: tonic::Code,
        message: String,
    },
}

/// Graph vendor error codes carried in the error envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ItemNotFound,
    InvalidRequest,
    Unauthenticated,
    GeneralException,
}

impl ErrorCode {
    /// Wire representation used in the `error.code` field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ItemNotFound => "itemNotFound",
            Self::InvalidRequest => "invalidRequest",
            Self::Unauthenticated => "unauthenticated",
            Self::GeneralException => "generalException",
        }
    }
}

impl Error {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Map a backend status onto the error taxonomy.
    ///
    /// `subject` names what was being looked up (account id, filter, path)
    /// and is only used for not-found errors.
    pub fn from_rpc(
        domain: RpcDomain,
        code: tonic::Code,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        match (domain, code) {
            (RpcDomain::Directory, tonic::Code::NotFound) => Self::AccountNotFound(subject.into()),
            (RpcDomain::Storage, tonic::Code::NotFound) => Self::ResourceNotFound(subject.into()),
            _ => Self::Backend {
                domain,
                code,
                message: message.into(),
            },
        }
    }

    /// Map a gRPC transport status onto the error taxonomy
    pub fn from_grpc(domain: RpcDomain, status: &tonic::Status, subject: impl Into<String>) -> Self {
        Self::from_rpc(domain, status.code(), status.message(), subject)
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::AmbiguousIdentity { .. } | Self::ResourceNotFound(_)
        )
    }

    /// Check if this error is internal: logged in full, shown generically
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.http_status_code() >= 500
    }

    /// Get HTTP status code
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidRequest(_) => 400,

            // 401 Unauthorized
            Self::Unauthenticated => 401,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::AmbiguousIdentity { .. } | Self::ResourceNotFound(_) => {
                404
            }

            // 500 Internal Server Error
            Self::SizeOverflow { .. }
            | Self::TimestampOverflow { .. }
            | Self::UnrecognizedResourceKind { .. }
            | Self::Backend { .. } => 500,

            // 504 Gateway Timeout
            Self::Timeout { .. } => 504,
        }
    }

    /// Get the Graph vendor error code
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::AccountNotFound(_) | Self::AmbiguousIdentity { .. } | Self::ResourceNotFound(_) => {
                ErrorCode::ItemNotFound
            }
            _ => ErrorCode::GeneralException,
        }
    }
}
