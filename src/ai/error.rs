//! Backend error types
//!
//! These errors never leave a backend: every variant is logged and turned into
//! an absent result at the [`AnalysisBackend`](super::AnalysisBackend) boundary
//! so that the chain can move on to the next backend.

use thiserror::Error;

/// Errors that can occur while talking to a remote analysis service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The service answered with a non-success status
    #[error("API error ({status_code}): {message}")]
    ApiError { message: String, status_code: u16 },

    /// Request timed out after the specified duration (in seconds)
    #[error("Request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    /// Connection refused, DNS failure, TLS failure, ...
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The body could not be decoded or did not contain generated text
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// A credential the backend needs is not configured
    #[error("Backend not configured: {message}")]
    NotConfigured { message: String },
}

impl BackendError {
    /// Classifies a transport-level reqwest error
    pub fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            BackendError::TimeoutError {
                seconds: timeout_secs,
            }
        } else if err.is_connect() {
            BackendError::NetworkError {
                message: format!("Connection failed: {}", err),
            }
        } else if err.is_decode() {
            BackendError::InvalidResponse {
                message: format!("JSON parse error: {}", err),
            }
        } else {
            BackendError::NetworkError {
                message: format!("Request failed: {}", err),
            }
        }
    }
}
