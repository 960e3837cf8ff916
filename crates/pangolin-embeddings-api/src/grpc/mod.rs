//! gRPC API implementation
//!
//! Generated protobuf code, the service implementations for the
//! `SentenceTransformers` and `Embeddings` variants, the error-translation
//! interceptor and the server lifecycle manager.

pub mod converters;
pub mod interceptor;
pub mod server;
pub mod service;

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("pangolin.embeddings.v1");
}

pub use proto::embeddings_client::EmbeddingsClient;
pub use proto::embeddings_server::{Embeddings, EmbeddingsServer};
pub use proto::sentence_transformers_client::SentenceTransformersClient;
pub use proto::sentence_transformers_server::{SentenceTransformers, SentenceTransformersServer};
pub use server::{GrpcServer, GrpcServerConfig, ServerError, ServerResult, ServerState};
pub use service::EmbeddingsGrpcService;
