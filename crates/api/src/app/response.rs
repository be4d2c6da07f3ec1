//! Uniform JSON response writing.
//!
//! Every body leaves through [`send_json`]: `content-type: application/json`,
//! the given status line, then the serialized body. A body that cannot be
//! serialized is replaced by a plain-text 500.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const ENCODE_FAILURE_BODY: &str = "Failed to encode JSON response";

/// Success/error envelope: `{"status": "404", "title": "Not Found", "detail": "..."}`.
///
/// The HTTP status is passed to the send functions separately and is not
/// part of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub status: String,
    pub title: String,
    pub detail: String,
}

impl Envelope {
    pub fn new(
        status: StatusCode,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status: status.as_str().to_string(),
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Titled "Success".
    pub fn success(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::new(status, "Success", detail)
    }

    /// Titled with the status' canonical reason, e.g. "Bad Gateway".
    pub fn error(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), detail)
    }
}

pub fn send_error(envelope: &Envelope, status: StatusCode) -> Response {
    send_json(status, envelope)
}

pub fn send_success(envelope: &Envelope, status: StatusCode) -> Response {
    send_json(status, envelope)
}

pub fn send_json<T>(status: StatusCode, body: &T) -> Response
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode JSON response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                )],
                ENCODE_FAILURE_BODY,
            )
                .into_response()
        }
    }
}
