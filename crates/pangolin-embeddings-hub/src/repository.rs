//! Hugging Face hub model repository
//!
//! Resolution checks the hub's model API for `{organization}/{name}` and only
//! accepts models published for the sentence-transformers library. A resolved
//! name becomes a [`HubModel`] bound to the inference endpoint.

use async_trait::async_trait;
use pangolin_embeddings_core::{EmbeddingModel, ModelError, ModelRepository, ModelResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::model::HubModel;

/// Library tag that marks a hub model as a sentence-transformers model
pub const SENTENCE_TRANSFORMERS_LIBRARY: &str = "sentence-transformers";

/// Subset of the hub's model card
#[derive(Debug, Clone, Deserialize)]
pub struct ModelCard {
    /// Fully qualified model id
    #[serde(default, alias = "modelId")]
    pub id: Option<String>,

    /// Library the model was published for
    #[serde(default)]
    pub library_name: Option<String>,

    /// Free-form hub tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Hub pipeline tag (e.g. sentence-similarity, feature-extraction)
    #[serde(default)]
    pub pipeline_tag: Option<String>,
}

impl ModelCard {
    /// Whether the card describes a sentence-transformers model
    pub fn is_sentence_transformer(&self) -> bool {
        self.library_name.as_deref() == Some(SENTENCE_TRANSFORMERS_LIBRARY)
            || self.tags.iter().any(|t| t == SENTENCE_TRANSFORMERS_LIBRARY)
    }
}

/// Model repository backed by the Hugging Face hub
pub struct HubRepository {
    client: reqwest::Client,
    config: HubConfig,
    identifier: String,
}

impl HubRepository {
    /// Create a repository from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: HubConfig) -> HubResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("pangolin-embeddings/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HubError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let identifier = config.identifier();
        Ok(Self {
            client,
            config,
            identifier,
        })
    }

    /// Fetch the model card for `{organization}/{model_name}`
    pub async fn model_card(&self, model_name: &str) -> HubResult<ModelCard> {
        let url = format!(
            "{}/api/models/{}/{}",
            self.config.hub_url.trim_end_matches('/'),
            self.config.organization,
            model_name
        );

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<ModelCard>().await?)
    }
}

#[async_trait]
impl ModelRepository for HubRepository {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    #[instrument(skip(self), fields(repository = %self.identifier))]
    async fn resolve(&self, model_name: &str) -> ModelResult<Arc<dyn EmbeddingModel>> {
        if model_name.is_empty()
            || model_name
                .chars()
                .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace())
        {
            return Err(ModelError::NotFound(format!(
                "invalid model name '{}'",
                model_name
            )));
        }

        let card = self.model_card(model_name).await.map_err(|e| match e {
            // The hub answers 401 for repositories that do not exist
            HubError::Status { status: 401, url } => ModelError::NotFound(url),
            other => ModelError::from(other),
        })?;

        if !card.is_sentence_transformer() {
            return Err(HubError::NotEmbeddingModel(format!(
                "{}/{}",
                self.config.organization, model_name
            ))
            .into());
        }

        debug!(pipeline = ?card.pipeline_tag, "model card accepted");

        let model_id = format!("{}/{}", self.config.organization, model_name);
        Ok(Arc::new(HubModel::new(
            self.client.clone(),
            &self.config.inference_url,
            model_id,
            self.config.api_token.clone(),
        )))
    }
}

impl std::fmt::Debug for HubRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubRepository")
            .field("identifier", &self.identifier)
            .field("config", &self.config)
            .finish()
    }
}
