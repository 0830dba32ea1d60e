//! Error types for platform operations

use cloudprobe_core::CoreError;
use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the platform client, waiters and fixture teardown
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timeout: {url}")]
    Timeout { url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("BareMetalHost {namespace}/{name} not found")]
    HostNotFound { namespace: String, name: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Whether the platform reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
            || matches!(self, ClientError::Status { status: 404, .. })
    }

    /// Whether a wait ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout { .. } | ClientError::Core(CoreError::PollTimedOut { .. })
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            ClientError::Timeout { url }
        } else if e.is_connect() {
            ClientError::Network {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            ClientError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            ClientError::Network {
                message: e.to_string(),
            }
        }
    }
}
