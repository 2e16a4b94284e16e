//! Directory filter construction
//!
//! Values are embedded in single-quoted OData string literals, so every
//! single quote is doubled before substitution.

use graphgate_common::config::IdentityConfig;

use crate::credentials::Credentials;
use crate::provider::Claims;

/// Escape a value for use inside a single-quoted filter literal
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Filter matching an account by login name and password
#[must_use]
pub fn credentials_filter(credentials: &Credentials) -> String {
    format!(
        "login eq '{}' and password eq '{}'",
        escape_literal(&credentials.username),
        escape_literal(&credentials.password)
    )
}

/// Templates mapping token claims to a directory filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsQuery {
    email_template: String,
    subject_template: String,
}

impl ClaimsQuery {
    pub fn new(email_template: impl Into<String>, subject_template: impl Into<String>) -> Self {
        Self {
            email_template: email_template.into(),
            subject_template: subject_template.into(),
        }
    }

    /// Build the filter for `claims`: by email when present, otherwise by
    /// issuer and subject.
    #[must_use]
    pub fn filter_for(&self, claims: &Claims) -> String {
        let template = if claims.email.is_empty() {
            &self.subject_template
        } else {
            &self.email_template
        };

        render(template, claims)
    }
}

/// Substitute placeholders in a single left-to-right pass, so a claim value
/// that itself looks like a placeholder is never expanded.
fn render(template: &str, claims: &Claims) -> String {
    let placeholders = [
        ("{mail}", claims.email.as_str()),
        ("{iss}", claims.issuer.as_str()),
        ("{sub}", claims.subject.as_str()),
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(&escape_literal(value));
                rest = &tail[name.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

impl Default for ClaimsQuery {
    fn default() -> Self {
        IdentityConfig::default().into()
    }
}

impl From<IdentityConfig> for ClaimsQuery {
    fn from(config: IdentityConfig) -> Self {
        Self::new(config.email_query, config.subject_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("o'brien"), "o''brien");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_credentials_filter_escapes_quotes() {
        let filter = credentials_filter(&Credentials::new("o'brien", "pa'ss"));
        assert_eq!(filter, "login eq 'o''brien' and password eq 'pa''ss'");
    }

    #[test]
    fn test_email_preferred() {
        let query = ClaimsQuery::default();
        let claims = Claims::new("https://idp", "sub-1").with_email("marie@example.org");
        assert_eq!(query.filter_for(&claims), "mail eq 'marie@example.org'");
    }

    #[test]
    fn test_issuer_subject_fallback() {
        let query = ClaimsQuery::new("mail eq '{mail}'", "iss eq '{iss}' and sub eq '{sub}'");
        let claims = Claims::new("https://idp", "it's-me");
        assert_eq!(
            query.filter_for(&claims),
            "iss eq 'https://idp' and sub eq 'it''s-me'"
        );
    }

    #[test]
    fn test_claim_values_are_not_expanded() {
        let query = ClaimsQuery::new("mail eq '{mail}'", "sub eq '{sub}'");
        let claims = Claims::new("i", "s").with_email("{sub}' or '1' eq '1");
        assert_eq!(
            query.filter_for(&claims),
            "mail eq '{sub}'' or ''1'' eq ''1'"
        );
    }

    #[test]
    fn test_unknown_braces_are_kept() {
        let query = ClaimsQuery::new("{x} {mail}", "");
        let claims = Claims::new("i", "s").with_email("m");
        assert_eq!(query.filter_for(&claims), "{x} m");
    }
}
