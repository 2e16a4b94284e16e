//! Graph error responses
//!
//! Error bodies follow the Graph envelope:
//! `{"error": {"code": "itemNotFound", "message": "..."}}`

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use graphgate_common::{Error, ErrorCode};
use serde::Serialize;
use tracing::error;

/// Message sent in place of the detail of a 5xx error
const INTERNAL_MESSAGE: &str = "internal server error";

/// Handler error rendered as a Graph error envelope
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ApiError {
    /// Status and vendor code for the wrapped error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Text safe to show the client. Internal errors are replaced by a
    /// generic message; ambiguous identities do not reveal candidate ids.
    fn public_message(&self) -> String {
        match &self.0 {
            e if e.is_internal() => INTERNAL_MESSAGE.to_string(),
            Error::AmbiguousIdentity { .. } => "no unique account matches".to_string(),
            e => e.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_internal() {
            error!("Request failed: {}", self.0);
        }
        envelope(status, self.0.error_code(), self.public_message())
    }
}

fn envelope(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = ErrorEnvelope {
        error: ErrorBody {
            code: code.as_str(),
            message,
        },
    };
    (status, axum::Json(body)).into_response()
}

/// 401 response offering both supported schemes
pub fn unauthorized() -> Response {
    let mut response = envelope(
        StatusCode::UNAUTHORIZED,
        ErrorCode::Unauthenticated,
        Error::Unauthenticated.to_string(),
    );
    let headers = response.headers_mut();
    headers.append(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
    headers.append(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}
