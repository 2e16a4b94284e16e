//! Access token extraction
//!
//! Order: `Authorization: Bearer <token>` header first (RFC 6750 §2.1), then
//! the `access_token` query parameter (RFC 6750 §2.3). Form-encoded body
//! tokens are not read since every Graph route here is a GET.

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the caller's access token from a request
#[must_use]
pub fn extract_access_token(headers: &http::HeaderMap, query: Option<&str>) -> Option<String> {
    bearer_from_headers(headers).or_else(|| query.and_then(access_token_from_query))
}

/// Token from an `Authorization: Bearer` header, if present and non-empty
#[must_use]
pub fn bearer_from_headers(headers: &http::HeaderMap) -> Option<String> {
    let header = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// Token from the first `access_token` query parameter, if non-empty.
/// Keys and values are form-decoded, so `access%5Ftoken` and `+` are
/// understood the way any other query parser reads them.
fn access_token_from_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
