//! Server configuration
//!
//! This module handles hierarchical configuration loading from multiple sources:
//! - Default configuration file
//! - Environment-specific configuration file
//! - Environment variables
//! - Command-line arguments (applied by `main`)

use config::{Config, ConfigError, Environment, File};
use pangolin_embeddings_api::GrpcServerConfig;
use pangolin_embeddings_hub::HubConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// gRPC server settings
    #[serde(default)]
    pub server: ListenerConfig,

    /// Model registry settings
    #[serde(default)]
    pub models: ModelsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Runtime worker threads, also the per-connection concurrency limit
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Graceful shutdown period in seconds
    #[serde(default = "default_shutdown_period")]
    pub shutdown_period_seconds: u64,

    /// Accept and send gzip-compressed messages
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

fn default_host() -> String {
    "[::]".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_worker_threads() -> usize {
    10
}

fn default_shutdown_period() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: default_worker_threads(),
            shutdown_period_seconds: default_shutdown_period(),
            enable_compression: default_true(),
        }
    }
}

/// Model registry configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Models to load at startup, in listing order
    #[serde(default = "default_model_list")]
    pub model_list: Vec<String>,

    /// Model hub base URL
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// Organization the models are published under
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Inference endpoint base URL
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    /// Hub API token
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_model_list() -> Vec<String> {
    vec!["all-MiniLM-L6-v2".to_string()]
}

fn default_hub_url() -> String {
    pangolin_embeddings_hub::config::DEFAULT_HUB_URL.to_string()
}

fn default_organization() -> String {
    pangolin_embeddings_hub::config::DEFAULT_ORGANIZATION.to_string()
}

fn default_inference_url() -> String {
    pangolin_embeddings_hub::config::DEFAULT_INFERENCE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    pangolin_embeddings_hub::config::DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            model_list: default_model_list(),
            hub_url: default_hub_url(),
            organization: default_organization(),
            inference_url: default_inference_url(),
            api_token: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for ModelsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelsConfig")
            .field("model_list", &self.model_list)
            .field("hub_url", &self.hub_url)
            .field("organization", &self.organization)
            .field("inference_url", &self.inference_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include thread IDs
    #[serde(default)]
    pub include_thread_ids: bool,

    /// Include target module
    #[serde(default = "default_true")]
    pub include_target: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_thread_ids: false,
            include_target: true,
        }
    }
}

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "PANGOLIN";

impl ServerConfig {
    /// Load configuration from files and environment
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default configuration file (config/default.toml)
    /// 2. Environment-specific file (config/{env}.toml)
    /// 3. Environment variables (PANGOLIN_*)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        Self::load_with_prefix(config_dir, environment, ENV_PREFIX)
    }

    /// Load configuration, reading environment overrides from `{env_prefix}_*`
    pub fn load_with_prefix(
        config_dir: impl Into<PathBuf>,
        environment: &str,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        let config = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            // e.g. PANGOLIN_SERVER__PORT=50052, PANGOLIN_MODELS__MODEL_LIST=a,b
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("models.model_list")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check values that deserialize fine but cannot be served
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port must not be 0".to_string()));
        }
        if self.server.worker_threads == 0 {
            return Err(ConfigError::Message(
                "server.worker_threads must be at least 1".to_string(),
            ));
        }
        if self.models.model_list.is_empty() {
            return Err(ConfigError::Message(
                "models.model_list must name at least one model".to_string(),
            ));
        }
        if self.models.model_list.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Message(
                "models.model_list contains an empty name".to_string(),
            ));
        }
        Ok(())
    }

    /// Lifecycle manager settings
    pub fn grpc_server_config(&self) -> GrpcServerConfig {
        GrpcServerConfig::new()
            .host(self.server.host.clone())
            .port(self.server.port)
            .worker_threads(self.server.worker_threads)
            .shutdown_period(Duration::from_secs(self.server.shutdown_period_seconds))
            .enable_compression(self.server.enable_compression)
    }

    /// Remote model repository settings
    pub fn hub_config(&self) -> HubConfig {
        HubConfig::new()
            .hub_url(self.models.hub_url.clone())
            .inference_url(self.models.inference_url.clone())
            .organization(self.models.organization.clone())
            .api_token(self.models.api_token.clone())
            .request_timeout(Duration::from_secs(self.models.request_timeout_seconds))
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
