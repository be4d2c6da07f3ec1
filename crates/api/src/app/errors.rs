use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use branches_infra::store::StoreError;

use crate::app::response::{self, Envelope};

/// Handler-boundary failure. Each variant maps to exactly one response.
///
/// The caller only sees the generic `detail`; the underlying cause is logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to acquire a store connection: {0}")]
    Connection(#[source] StoreError),

    #[error("{detail}: {reason}")]
    Validation { detail: &'static str, reason: String },

    /// Status and wording differ per operation (400 on get, 502 on update/delete).
    #[error("invalid branch id {raw:?}")]
    InvalidId {
        raw: String,
        status: StatusCode,
        detail: &'static str,
    },

    #[error("{detail}")]
    NotFound { detail: &'static str },

    #[error("{detail}: {reason}")]
    Persistence { detail: &'static str, reason: String },
}

impl ApiError {
    pub fn validation(detail: &'static str, reason: impl ToString) -> Self {
        Self::Validation {
            detail,
            reason: reason.to_string(),
        }
    }

    pub fn persistence(detail: &'static str, reason: impl ToString) -> Self {
        Self::Persistence {
            detail,
            reason: reason.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Connection(_) | ApiError::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidId { status, .. } => *status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            ApiError::Connection(_) => "Failed to connect to the database",
            ApiError::InvalidId { detail, .. }
            | ApiError::Validation { detail, .. }
            | ApiError::NotFound { detail }
            | ApiError::Persistence { detail, .. } => *detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !matches!(self, ApiError::InvalidId { .. }) {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        response::send_error(&Envelope::error(status, self.detail()), status)
    }
}
