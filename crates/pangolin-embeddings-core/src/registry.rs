//! Model registry
//!
//! The registry is built once at startup from an ordered list of model names
//! and is immutable afterwards. It is shared by every request without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{EmbeddingError, ModelError, ModelResult, RegistryResult};
use crate::model::{Embedding, EmbeddingModel, ModelRepository};

/// Name-to-model mapping of every loaded embedding model
pub struct ModelRegistry {
    models: HashMap<String, Arc<dyn EmbeddingModel>>,
    names: Vec<String>,
    repository: String,
}

impl ModelRegistry {
    /// Resolve every named model against `repository`
    ///
    /// Models are loaded in the order given. Repeated names are loaded once and
    /// keep their first position. Loading stops at the first name that cannot
    /// be resolved and no registry is returned.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::ModelRemoteImport`] naming the model and the
    /// repository that failed to resolve it.
    #[instrument(skip_all, fields(repository = repository.identifier()))]
    pub async fn new<I, S>(model_names: I, repository: &dyn ModelRepository) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identifier = repository.identifier().to_string();
        let mut models: HashMap<String, Arc<dyn EmbeddingModel>> = HashMap::new();
        let mut names = Vec::new();

        for model_name in model_names {
            let model_name = model_name.into();
            if models.contains_key(&model_name) {
                continue;
            }

            debug!("{} importing: {}", identifier, model_name);
            let model = repository.resolve(&model_name).await.map_err(|e| {
                warn!(model = %model_name, error = %e, "model resolution failed");
                EmbeddingError::remote_import(&model_name, &identifier)
            })?;

            models.insert(model_name.clone(), model);
            names.push(model_name);
        }

        info!("{} loaded successfully", identifier);

        Ok(Self {
            models,
            names,
            repository: identifier,
        })
    }

    /// Encode `text` with a loaded model
    ///
    /// The caller must check membership first; an unknown name here is a
    /// programming error and yields [`ModelError::NotLoaded`].
    pub async fn encode(&self, text: &[String], model_name: &str) -> ModelResult<Vec<Embedding>> {
        let model = self
            .models
            .get(model_name)
            .ok_or_else(|| ModelError::NotLoaded(model_name.to_string()))?;

        model.encode(text).await
    }

    /// Names of every loaded model, in the order first requested
    pub fn list_names(&self) -> &[String] {
        &self.names
    }

    /// Whether a model with this name is loaded
    pub fn contains(&self, model_name: &str) -> bool {
        self.models.contains_key(model_name)
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no models are loaded
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("names", &self.names)
            .field("repository", &self.repository)
            .finish()
    }
}
