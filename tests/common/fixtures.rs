//! Test fixtures
//!
//! Deterministic stand-ins for real embedding models.

use async_trait::async_trait;
use pangolin_embeddings_core::{Embedding, EmbeddingModel, ModelError, ModelRepository, ModelResult};
use std::sync::Arc;
use std::time::Duration;

/// Name of the model every fixture server loads
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Name of the model that sleeps before answering
pub const SLOW_MODEL: &str = "slow-model";

/// Dimension of [`HashModel`] vectors
pub const DIMENSIONS: usize = 8;

/// Deterministic model: byte values folded into fixed buckets
#[derive(Debug, Default)]
pub struct HashModel;

impl HashModel {
    pub fn embed(text: &str) -> Embedding {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % DIMENSIONS] += f32::from(byte) / 255.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for HashModel {
    async fn encode(&self, text: &[String]) -> ModelResult<Vec<Embedding>> {
        Ok(text.iter().map(|t| Self::embed(t)).collect())
    }
}

/// [`HashModel`] behind a fixed delay
#[derive(Debug)]
pub struct SlowModel {
    pub delay: Duration,
}

#[async_trait]
impl EmbeddingModel for SlowModel {
    async fn encode(&self, text: &[String]) -> ModelResult<Vec<Embedding>> {
        tokio::time::sleep(self.delay).await;
        HashModel.encode(text).await
    }
}

/// Repository serving [`HashModel`] and [`SlowModel`]
#[derive(Debug)]
pub struct StubRepository {
    pub slow_delay: Duration,
}

impl Default for StubRepository {
    fn default() -> Self {
        Self {
            slow_delay: Duration::from_millis(200),
        }
    }
}

#[async_trait]
impl ModelRepository for StubRepository {
    fn identifier(&self) -> &str {
        "stub.local/sentence-transformers"
    }

    async fn resolve(&self, model_name: &str) -> ModelResult<Arc<dyn EmbeddingModel>> {
        match model_name {
            DEFAULT_MODEL => Ok(Arc::new(HashModel)),
            SLOW_MODEL => Ok(Arc::new(SlowModel {
                delay: self.slow_delay,
            })),
            other => Err(ModelError::NotFound(other.to_string())),
        }
    }
}

/// Sample input texts
pub fn sample_texts() -> Vec<String> {
    [
        "lorem ipsum",
        "The quick brown fox jumps over the lazy dog",
        "",
        "pangolins are scaly mammals",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
