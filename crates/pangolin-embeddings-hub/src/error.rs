//! Hub-specific error types and conversions

use pangolin_embeddings_core::ModelError;
use thiserror::Error;

/// Result type alias for hub operations
pub type HubResult<T> = Result<T, HubError>;

/// Errors raised while talking to the model hub or the inference endpoint
#[derive(Debug, Error)]
pub enum HubError {
    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection, TLS or timeout failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The model exists but is not usable as an embedding model
    #[error("Not an embedding model: {0}")]
    NotEmbeddingModel(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HubError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            HubError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            HubError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Decode(err.to_string())
    }
}

impl From<HubError> for ModelError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::NotEmbeddingModel(msg) => ModelError::NotFound(msg),
            HubError::Status { status: 404, url } => ModelError::NotFound(url),
            HubError::Decode(msg) => ModelError::InvalidResponse(msg),
            other => ModelError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_conversion() {
        let err: ModelError = HubError::Status {
            status: 404,
            url: "http://hub/api/models/x".to_string(),
        }
        .into();
        assert!(matches!(err, ModelError::NotFound(_)));

        let err: ModelError = HubError::Decode("expected array".to_string()).into();
        assert!(matches!(err, ModelError::InvalidResponse(_)));

        let err: ModelError = HubError::Status {
            status: 500,
            url: "http://hub/api".to_string(),
        }
        .into();
        assert!(matches!(err, ModelError::Transport(_)));
    }
}
