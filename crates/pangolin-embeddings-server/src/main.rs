//! Pangolin Embeddings Server
//!
//! Main entry point for the embeddings gRPC server.
//! This binary loads configuration, resolves every configured model, then
//! serves them until SIGINT or SIGTERM triggers a graceful shutdown.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use pangolin_embeddings_api::{EmbeddingHandler, EmbeddingsGrpcService, GrpcServer};
use pangolin_embeddings_core::ModelRegistry;
use pangolin_embeddings_hub::HubRepository;
use tracing::{error, info};

use crate::config::ServerConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Runtime worker threads
    #[arg(long)]
    worker_threads: Option<usize>,

    /// Graceful shutdown period in seconds
    #[arg(long)]
    shutdown_period: Option<u64>,

    /// Comma-separated models to load
    #[arg(long, value_delimiter = ',')]
    models: Option<Vec<String>>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Override configuration values with command-line arguments
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(worker_threads) = self.worker_threads {
            config.server.worker_threads = worker_threads;
        }
        if let Some(shutdown_period) = self.shutdown_period {
            config.server.shutdown_period_seconds = shutdown_period;
        }
        if let Some(models) = self.models {
            config.models.model_list = models;
        }
        if let Some(log_level) = self.log_level {
            config.logging.level = log_level;
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let environment = args.environment.clone();

    let mut config = ServerConfig::load(&args.config_dir, &environment)
        .context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let telemetry_config = telemetry::TelemetryConfig::new()
        .with_log_level(config.logging.level.clone())
        .with_json_format(config.logging.json_format)
        .with_thread_ids(config.logging.include_thread_ids)
        .with_target(config.logging.include_target)
        .with_env_overrides();
    telemetry::init_with_config(&telemetry_config).context("Failed to initialize logging")?;

    info!("Starting Pangolin embeddings server");
    info!("Environment: {}", environment);
    info!("Server: {}", config.bind_address());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .thread_name("pangolin-worker")
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;

    let result = runtime.block_on(run(config));
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Load the registry, then serve until termination
async fn run(config: ServerConfig) -> Result<()> {
    let repository =
        HubRepository::new(config.hub_config()).context("Invalid model hub configuration")?;

    info!("Loading models: {}", config.models.model_list.join(", "));
    let registry = ModelRegistry::new(config.models.model_list.clone(), &repository)
        .await
        .context("Failed to load models")?;
    info!("{} models ready", registry.len());

    let service = EmbeddingsGrpcService::new(EmbeddingHandler::new(registry));
    let server = GrpcServer::new(config.grpc_server_config(), service);

    server
        .start(true)
        .await
        .context("Failed to start gRPC server")?;

    info!("Server shutdown complete");
    Ok(())
}
