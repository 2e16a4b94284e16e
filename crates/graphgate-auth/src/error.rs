//! Authentication error types

use thiserror::Error;

/// Errors raised while reading credentials from a request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingAuthHeader,

    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    #[error("unsupported authorization scheme")]
    UnsupportedScheme,

    #[error("credentials are not valid base64")]
    InvalidEncoding,

    #[error("credentials are not valid UTF-8")]
    InvalidUtf8,

    #[error("credentials lack the user:password separator")]
    MissingSeparator,
}
