//! Pangolin Embeddings API Layer
//!
//! This crate exposes a [`ModelRegistry`](pangolin_embeddings_core::ModelRegistry)
//! over gRPC. It includes the request handlers, the error-translation
//! interceptor, the service implementations and the server lifecycle manager.
//!
//! # Architecture
//!
//! - **Handlers**: transport-independent logic behind each RPC
//! - **Error Handling**: mapping of domain errors to gRPC status codes
//! - **gRPC**: generated protobuf types, services, interceptor and lifecycle
//!
//! # Example
//!
//! ```rust,no_run
//! use pangolin_embeddings_api::{EmbeddingHandler, EmbeddingsGrpcService, GrpcServer, GrpcServerConfig};
//! use pangolin_embeddings_core::ModelRegistry;
//!
//! # async fn example(registry: ModelRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let service = EmbeddingsGrpcService::new(EmbeddingHandler::new(registry));
//! let server = GrpcServer::new(GrpcServerConfig::new().port(50051), service);
//!
//! // Blocks until SIGINT or SIGTERM, then drains in-flight calls
//! server.start(true).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod grpc;
pub mod handlers;

// Re-export main types for convenience
pub use error::{domain_status, status_code, status_token, HandlerError, HandlerResult};
pub use grpc::{
    proto, EmbeddingsClient, EmbeddingsGrpcService, GrpcServer, GrpcServerConfig,
    SentenceTransformersClient, ServerError, ServerResult, ServerState,
};
pub use handlers::EmbeddingHandler;
