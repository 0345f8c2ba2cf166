//! API Errors

use thiserror::Error;

/// Result alias for backend calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything that can go wrong between issuing a request and holding a typed value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (offline, CORS, DNS...)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("API error: {0}")]
    Status(u16),

    /// The abort-after-duration wrapper fired
    #[error("request aborted")]
    Aborted,

    /// The body could not be turned into the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status, when the backend did answer
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        assert_eq!(ApiError::Status(404).status(), Some(404));
        assert_eq!(ApiError::Aborted.status(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ApiError::Status(500).to_string(), "API error: 500");
    }
}
