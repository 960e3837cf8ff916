//! API error handling
//!
//! This module declares how handler failures map onto gRPC status codes.
//! Only domain errors get a client-facing status; everything else surfaces as
//! an internal failure.

use pangolin_embeddings_core::{EmbeddingError, ModelError};
use thiserror::Error;
use tonic::{Code, Status};

/// Result type for request handlers
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Failures returned by request handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Domain error with a declared status mapping
    #[error(transparent)]
    Domain(#[from] EmbeddingError),

    /// Failure inside a loaded model
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Broken invariant or programming error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        HandlerError::Internal(message.into())
    }
}

/// Status code class of a domain error
pub fn status_code(err: &EmbeddingError) -> Code {
    match err {
        EmbeddingError::ModelNotImplemented { .. } => Code::InvalidArgument,
        EmbeddingError::ModelRemoteImport { .. } => Code::NotFound,
    }
}

/// Wire status of a domain error
pub fn domain_status(err: &EmbeddingError) -> Status {
    Status::new(status_code(err), err.to_string())
}

/// Upper-case status token used in log lines, e.g. `INVALID_ARGUMENT`
pub fn status_token(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}
