//! Request handlers
//!
//! Transport-independent logic behind each RPC. Handlers validate the model
//! name against the registry, call into it and enforce the response shape.
//! They never build transport statuses themselves.

use pangolin_embeddings_core::{Embedding, EmbeddingError, ModelRegistry};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{HandlerError, HandlerResult};

/// Handler shared by every embedding service
#[derive(Debug, Clone)]
pub struct EmbeddingHandler {
    registry: Arc<ModelRegistry>,
}

impl EmbeddingHandler {
    /// Create a handler that owns `registry`
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Encode `text` with `model_name`
    ///
    /// # Errors
    ///
    /// - [`EmbeddingError::ModelNotImplemented`] if the model is not loaded
    /// - [`HandlerError::Model`] if the model fails
    /// - [`HandlerError::Internal`] if the model returns the wrong number of vectors
    #[instrument(skip(self, text), fields(inputs = text.len()))]
    pub async fn inference(
        &self,
        text: Vec<String>,
        model_name: &str,
    ) -> HandlerResult<Vec<Embedding>> {
        if !self.registry.contains(model_name) {
            return Err(EmbeddingError::not_implemented(model_name).into());
        }

        if text.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.registry.encode(&text, model_name).await?;

        if embeddings.len() != text.len() {
            return Err(HandlerError::internal(format!(
                "{} produced {} embeddings for {} inputs",
                model_name,
                embeddings.len(),
                text.len()
            )));
        }

        debug!(model = model_name, "inference complete");
        Ok(embeddings)
    }

    /// Names of every loaded model
    pub fn model_list(&self) -> Vec<String> {
        self.registry.list_names().to_vec()
    }
}
