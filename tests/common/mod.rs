//! Common test utilities and helpers
//!
//! This module provides a fixture server bound on an ephemeral local port and
//! connected clients for every exposed service.

#![allow(dead_code)]

use pangolin_embeddings_api::proto::{InferenceRequest, ModelListRequest};
use pangolin_embeddings_api::{
    EmbeddingHandler, EmbeddingsClient, EmbeddingsGrpcService, GrpcServer, GrpcServerConfig,
    SentenceTransformersClient,
};
use pangolin_embeddings_core::{ModelRegistry, ModelRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

pub mod fixtures;

pub use fixtures::{HashModel, StubRepository, DEFAULT_MODEL, SLOW_MODEL};

/// Running server plus its address
pub struct TestServer {
    pub server: Arc<GrpcServer>,
    pub addr: SocketAddr,
}

impl TestServer {
    /// Serve [`DEFAULT_MODEL`] with a short grace period
    pub async fn start() -> Self {
        Self::builder().start().await
    }

    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Base URL for clients
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn sentence_transformers(&self) -> SentenceTransformersClient<Channel> {
        SentenceTransformersClient::connect(self.url())
            .await
            .expect("Failed to connect SentenceTransformers client")
    }

    pub async fn embeddings(&self) -> EmbeddingsClient<Channel> {
        EmbeddingsClient::connect(self.url())
            .await
            .expect("Failed to connect Embeddings client")
    }

    pub async fn health(&self) -> HealthClient<Channel> {
        let channel = Channel::from_shared(self.url())
            .expect("Invalid server URL")
            .connect()
            .await
            .expect("Failed to connect health client");
        HealthClient::new(channel)
    }

    /// Stop the server and wait for shutdown to finish
    pub async fn stop(&self) {
        self.server.stop().await;
    }
}

/// Configures a [`TestServer`]
pub struct TestServerBuilder {
    models: Vec<String>,
    repository: StubRepository,
    shutdown_period: Duration,
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self {
            models: vec![DEFAULT_MODEL.to_string()],
            repository: StubRepository::default(),
            shutdown_period: Duration::from_millis(500),
        }
    }
}

impl TestServerBuilder {
    pub fn models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn slow_delay(mut self, delay: Duration) -> Self {
        self.repository.slow_delay = delay;
        self
    }

    pub fn shutdown_period(mut self, period: Duration) -> Self {
        self.shutdown_period = period;
        self
    }

    pub async fn start(self) -> TestServer {
        start_with_repository(self.models, &self.repository, self.shutdown_period).await
    }
}

/// Build a registry from `repository` and serve it on `127.0.0.1:0`
pub async fn start_with_repository(
    models: Vec<String>,
    repository: &dyn ModelRepository,
    shutdown_period: Duration,
) -> TestServer {
    let registry = ModelRegistry::new(models, repository)
        .await
        .expect("Failed to build registry");
    let service = EmbeddingsGrpcService::new(EmbeddingHandler::new(registry));

    let config = GrpcServerConfig::new()
        .host("127.0.0.1")
        .port(0)
        .worker_threads(4)
        .shutdown_period(shutdown_period)
        .handle_signals(false);

    let server = Arc::new(GrpcServer::new(config, service));
    let addr = server.start(false).await.expect("Failed to start server");

    TestServer { server, addr }
}

/// Inference request helper
pub fn inference_request(text: &[&str], model_name: &str) -> InferenceRequest {
    InferenceRequest {
        text: text.iter().map(|t| t.to_string()).collect(),
        model_name: model_name.to_string(),
    }
}

pub fn model_list_request() -> ModelListRequest {
    ModelListRequest {}
}

/// Health check request for `service` ("" for the whole server)
pub fn health_request(service: &str) -> HealthCheckRequest {
    HealthCheckRequest {
        service: service.to_string(),
    }
}
