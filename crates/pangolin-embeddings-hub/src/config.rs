//! Hub client configuration

use std::time::Duration;

use crate::error::{HubError, HubResult};

/// Default model hub
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Default hosted inference endpoint
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Default model organization
pub const DEFAULT_ORGANIZATION: &str = "sentence-transformers";

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the hub repository and its models
#[derive(Clone)]
pub struct HubConfig {
    /// Base URL of the model hub API (e.g., https://huggingface.co)
    pub hub_url: String,

    /// Base URL of the feature-extraction inference endpoint
    pub inference_url: String,

    /// Organization that owns the models (e.g., sentence-transformers)
    pub organization: String,

    /// Bearer token sent to both endpoints
    pub api_token: Option<String>,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl HubConfig {
    /// Create a configuration pointing at the public Hugging Face endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hub URL
    pub fn hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into();
        self
    }

    /// Set the inference URL
    pub fn inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = url.into();
        self
    }

    /// Set the model organization
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Set the API token
    pub fn api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Repository identifier used in error messages, e.g. `huggingface.co/sentence-transformers`
    pub fn identifier(&self) -> String {
        let host = self
            .hub_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!("{}/{}", host, self.organization)
    }

    /// Validate the configuration
    pub fn validate(&self) -> HubResult<()> {
        for (field, value) in [("hub_url", &self.hub_url), ("inference_url", &self.inference_url)] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(HubError::Configuration(format!(
                    "{} must be an http(s) URL, got '{}'",
                    field, value
                )));
            }
        }

        if self.organization.is_empty() {
            return Err(HubError::Configuration(
                "organization cannot be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(HubError::Configuration(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConfig")
            .field("hub_url", &self.hub_url)
            .field("inference_url", &self.inference_url)
            .field("organization", &self.organization)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
