//! Bearer-token verification seam
//!
//! Token validation (signature checks, issuer discovery, expiry) belongs to
//! an external identity verifier. The gateway only needs the verified
//! claims, so the verifier is plugged in behind [`ClaimsVerifier`].

use async_trait::async_trait;

/// Identity assertions taken from a verified bearer token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    /// Token issuer (`iss`)
    pub issuer: String,
    /// Subject identifier at the issuer (`sub`)
    pub subject: String,
    /// Email address, empty when the token does not carry one
    pub email: String,
}

impl Claims {
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            email: String::new(),
        }
    }

    /// Set email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

/// Verification error types
#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("No token verifier configured")]
    NotConfigured,
}

/// Trait for pluggable bearer-token verifiers
#[async_trait]
pub trait ClaimsVerifier: Send + Sync {
    /// Verifier name for logging
    fn name(&self) -> &str;

    /// Verify `token` and return its claims
    async fn verify(&self, token: &str) -> Result<Claims, AuthProviderError>;
}

/// Verifier used when no identity provider is wired in: every token is
/// rejected, leaving Basic authentication as the only way in.
pub struct RejectingVerifier;

#[async_trait]
impl ClaimsVerifier for RejectingVerifier {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn verify(&self, _token: &str) -> Result<Claims, AuthProviderError> {
        Err(AuthProviderError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_builder() {
        let claims = Claims::new("https://idp.example.org", "f7fbf8c8").with_email("a@example.org");
        assert_eq!(claims.issuer, "https://idp.example.org");
        assert_eq!(claims.subject, "f7fbf8c8");
        assert_eq!(claims.email, "a@example.org");
    }

    #[tokio::test]
    async fn test_rejecting_verifier() {
        let err = RejectingVerifier.verify("any").await.unwrap_err();
        assert!(matches!(err, AuthProviderError::NotConfigured));
    }
}
