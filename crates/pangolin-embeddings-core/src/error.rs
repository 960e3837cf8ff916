//! Error types for the embeddings service
//!
//! Two families live here. [`EmbeddingError`] is the domain taxonomy that
//! callers of the service can observe; every variant has a fixed status class
//! assigned at the transport boundary. [`ModelError`] covers failures of the
//! opaque embedding models and repositories themselves and is never
//! translated into a client-facing status.

use thiserror::Error;

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, EmbeddingError>;

/// Result type alias for model and repository operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Domain errors of the embeddings service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingError {
    /// A request referenced a model that is not in the registry
    #[error("{model_name} is not implemented. Please see implemented models from ModelList method.")]
    ModelNotImplemented { model_name: String },

    /// A configured model could not be resolved from its remote repository
    #[error("{model_name} not found on {repository}")]
    ModelRemoteImport {
        model_name: String,
        repository: String,
    },
}

impl EmbeddingError {
    /// Create a model-not-implemented error
    pub fn not_implemented(model_name: impl Into<String>) -> Self {
        Self::ModelNotImplemented {
            model_name: model_name.into(),
        }
    }

    /// Create a remote-import error
    pub fn remote_import(model_name: impl Into<String>, repository: impl Into<String>) -> Self {
        Self::ModelRemoteImport {
            model_name: model_name.into(),
            repository: repository.into(),
        }
    }
}

/// Failures raised by embedding models and model repositories
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model does not exist in the repository or is not an embedding model
    #[error("Model not found: {0}")]
    NotFound(String),

    /// The registry was asked for a model it never loaded
    #[error("Model not loaded: {0}")]
    NotLoaded(String),

    /// Network or protocol failure while talking to a remote backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not a valid embedding
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
