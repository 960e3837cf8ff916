//! Core types for the Pangolin embeddings service
//!
//! This crate holds the model registry, the embedding model capabilities it
//! is built from, and the domain error taxonomy shared by every layer.

pub mod error;
pub mod model;
pub mod registry;

// Re-exports for convenience
pub use error::{EmbeddingError, ModelError, ModelResult, RegistryResult};
pub use model::{Embedding, EmbeddingModel, ModelRepository};
pub use registry::ModelRegistry;
