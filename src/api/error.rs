use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::client::ApiError;

/// Errors a view answers the browser with, as `{"error": "<message>"}`.
#[derive(Debug, Display)]
pub enum ViewError {
    /// Input rejected before any backend call.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// The backend call failed; carries the message shown to the user.
    #[display(fmt = "{}", _0)]
    Upstream(String),

    /// A newer call on the same view replaced this one. The browser drops these.
    #[display(fmt = "superseded")]
    Superseded,

    /// Local failure building a response (document rendering, storage).
    #[display(fmt = "{}", _0)]
    Render(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),
}

impl std::error::Error for ViewError {}

impl ViewError {
    pub fn validation(message: impl Into<String>) -> Self {
        ViewError::Validation(message.into())
    }

    /// Replaces the upstream message with a view-specific one; a cancelled
    /// call stays superseded.
    pub fn upstream_as(err: ApiError, message: &str) -> Self {
        if err.is_cancelled() {
            ViewError::Superseded
        } else {
            ViewError::Upstream(message.to_string())
        }
    }
}

pub const SERVICE_UNAVAILABLE: &str = "Could not reach the salary service. Please try again later.";

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => ViewError::Superseded,
            ApiError::Backend { message, .. } => ViewError::Upstream(message),
            ApiError::Transport(detail) | ApiError::Decode(detail) => {
                error!(error = %detail, "Salary service call failed");
                ViewError::Upstream(SERVICE_UNAVAILABLE.to_string())
            }
        }
    }
}

impl ResponseError for ViewError {
    fn status_code(&self) -> StatusCode {
        match self {
            ViewError::Validation(_) => StatusCode::BAD_REQUEST,
            ViewError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ViewError::Superseded => StatusCode::CONFLICT,
            ViewError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ViewError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
