//! Transport-level errors from the remote message store

/// Failure of a single request to the remote store
///
/// Callers do not branch on the status value; every variant is handled
/// the same way by the sync controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("server responded with HTTP {code}")]
    Status { code: u16 },
    #[error("request failed: {message}")]
    Transport { message: String },
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => ApiError::Status { code },
            other => ApiError::Transport {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}
