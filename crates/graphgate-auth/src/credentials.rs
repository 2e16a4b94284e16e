//! HTTP Basic credentials

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::fmt;

use crate::error::AuthError;

/// Username and password presented with `Authorization: Basic`
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse the value of an `Authorization` header.
    ///
    /// The scheme name is matched case-insensitively. The password may
    /// contain colons; only the first one separates it from the username.
    ///
    /// # Errors
    /// Returns an [`AuthError`] describing why the header is not usable Basic
    /// credentials.
    pub fn from_authorization(header: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthError::InvalidAuthHeader)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme);
        }

        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidEncoding)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidUtf8)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MissingSeparator)?;

        Ok(Self::new(username, password))
    }

    /// Read Basic credentials from request headers
    ///
    /// # Errors
    /// `AuthError::MissingAuthHeader` if there is no `Authorization` header,
    /// otherwise see [`Credentials::from_authorization`].
    pub fn from_headers(headers: &http::HeaderMap) -> Result<Self, AuthError> {
        let value = headers
            .get(http::header::AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;
        Self::from_authorization(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
