//! Remote embedding model
//!
//! A [`HubModel`] forwards encode calls to a feature-extraction endpoint. The
//! endpoint receives the whole batch and must return one vector per input.

use async_trait::async_trait;
use pangolin_embeddings_core::{Embedding, EmbeddingModel, ModelError, ModelResult};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::HubResult;

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: FeatureExtractionOptions,
}

#[derive(Debug, Serialize)]
struct FeatureExtractionOptions {
    wait_for_model: bool,
}

/// Embedding model served by a remote feature-extraction endpoint
#[derive(Clone)]
pub struct HubModel {
    client: reqwest::Client,
    model_id: String,
    endpoint: String,
    api_token: Option<String>,
}

impl HubModel {
    /// Create a model handle for `{organization}/{name}` served under `inference_url`
    pub fn new(
        client: reqwest::Client,
        inference_url: &str,
        model_id: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        let model_id = model_id.into();
        let endpoint = format!(
            "{}/pipeline/feature-extraction/{}",
            inference_url.trim_end_matches('/'),
            model_id
        );
        Self {
            client,
            model_id,
            endpoint,
            api_token,
        }
    }

    async fn request(&self, text: &[String]) -> HubResult<Vec<Embedding>> {
        let body = FeatureExtractionRequest {
            inputs: text,
            options: FeatureExtractionOptions {
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice::<Vec<Embedding>>(&bytes)?)
    }
}

#[async_trait]
impl EmbeddingModel for HubModel {
    #[instrument(skip(self, text), fields(model = %self.model_id, inputs = text.len()))]
    async fn encode(&self, text: &[String]) -> ModelResult<Vec<Embedding>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.request(text).await.map_err(ModelError::from)?;

        if embeddings.len() != text.len() {
            return Err(ModelError::InvalidResponse(format!(
                "{} returned {} vectors for {} inputs",
                self.model_id,
                embeddings.len(),
                text.len()
            )));
        }

        debug!("encoded {} inputs", text.len());
        Ok(embeddings)
    }
}

impl std::fmt::Debug for HubModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubModel")
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
