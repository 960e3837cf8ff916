//! Embedding model capabilities
//!
//! The service treats embedding models as opaque: a model turns an ordered
//! batch of strings into one vector per string, and a repository turns a
//! model name into a ready-to-use model. Concrete backends live in other
//! crates.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ModelResult;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// A loaded embedding model
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Encode every input string, returning vectors in input order
    async fn encode(&self, text: &[String]) -> ModelResult<Vec<Embedding>>;
}

/// A remote source of embedding models
#[async_trait]
pub trait ModelRepository: Send + Sync {
    /// Human readable repository identifier, e.g. `huggingface.co/sentence-transformers`
    fn identifier(&self) -> &str;

    /// Resolve and load a model by name
    async fn resolve(&self, model_name: &str) -> ModelResult<Arc<dyn EmbeddingModel>>;
}
