use derive_more::Display;

/// Failure of a call made through an [`ApiHandle`](super::ApiHandle).
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ApiError {
    /// Superseded by a newer call on the same handle, or the handle was torn down.
    #[display(fmt = "request canceled")]
    Cancelled,

    /// The request never produced a response.
    #[display(fmt = "{}", _0)]
    Transport(String),

    /// The backend answered with a non-success status; `message` is its
    /// `message` field when it sent one.
    #[display(fmt = "{}", message)]
    Backend { status: u16, message: String },

    #[display(fmt = "unexpected response: {}", _0)]
    Decode(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
