//! gRPC service implementation
//!
//! One service value backs both the `SentenceTransformers` and the
//! `Embeddings` variants. They share a handler and therefore a registry.

use super::interceptor::intercept;
use super::proto::{
    self, embeddings_server::Embeddings, embeddings_server::EmbeddingsServer,
    sentence_transformers_server::SentenceTransformers,
    sentence_transformers_server::SentenceTransformersServer,
};
use crate::handlers::EmbeddingHandler;
use tokio_util::sync::CancellationToken;
use tonic::server::NamedService;
use tonic::{Request, Response, Status};
use tracing::warn;

const SENTENCE_TRANSFORMERS_INFERENCE: &str = "SentenceTransformers/Inference";
const SENTENCE_TRANSFORMERS_MODEL_LIST: &str = "SentenceTransformers/ModelList";
const EMBEDDINGS_INFERENCE: &str = "Embeddings/Inference";
const EMBEDDINGS_MODEL_LIST: &str = "Embeddings/ModelList";

/// gRPC service implementation
///
/// Clones share the abort token, so [`abort_in_flight`](Self::abort_in_flight)
/// reaches every call served by any clone.
#[derive(Debug, Clone)]
pub struct EmbeddingsGrpcService {
    handler: EmbeddingHandler,
    aborted: CancellationToken,
}

impl EmbeddingsGrpcService {
    /// Create a new gRPC service instance
    pub fn new(handler: EmbeddingHandler) -> Self {
        Self {
            handler,
            aborted: CancellationToken::new(),
        }
    }

    /// Fail every in-flight and future call with `UNAVAILABLE`
    pub fn abort_in_flight(&self) {
        self.aborted.cancel();
    }

    /// Fully qualified names of the services exposed by this value
    pub fn service_names() -> [&'static str; 2] {
        [
            <SentenceTransformersServer<Self> as NamedService>::NAME,
            <EmbeddingsServer<Self> as NamedService>::NAME,
        ]
    }

    async fn serve_inference(
        &self,
        method: &str,
        request: Request<proto::InferenceRequest>,
    ) -> Result<Response<proto::InferenceResponse>, Status> {
        if self.aborted.is_cancelled() {
            warn!("{} rejected after shutdown grace period", method);
            return Err(Status::unavailable("server is shutting down"));
        }

        let req = request.into_inner();

        let call = intercept(method, async move {
            let embeddings = self.handler.inference(req.text, &req.model_name).await?;
            Ok(proto::InferenceResponse::from(embeddings))
        });

        tokio::select! {
            biased;
            _ = self.aborted.cancelled() => {
                warn!("{} dropped after shutdown grace period", method);
                Err(Status::unavailable("server is shutting down"))
            }
            result = call => result,
        }
    }

    async fn serve_model_list(
        &self,
        method: &str,
    ) -> Result<Response<proto::ModelListResponse>, Status> {
        intercept(method, async {
            Ok(proto::ModelListResponse::from(self.handler.model_list()))
        })
        .await
    }
}

#[tonic::async_trait]
impl SentenceTransformers for EmbeddingsGrpcService {
    async fn inference(
        &self,
        request: Request<proto::InferenceRequest>,
    ) -> Result<Response<proto::InferenceResponse>, Status> {
        self.serve_inference(SENTENCE_TRANSFORMERS_INFERENCE, request).await
    }

    async fn model_list(
        &self,
        _request: Request<proto::ModelListRequest>,
    ) -> Result<Response<proto::ModelListResponse>, Status> {
        self.serve_model_list(SENTENCE_TRANSFORMERS_MODEL_LIST).await
    }
}

#[tonic::async_trait]
impl Embeddings for EmbeddingsGrpcService {
    async fn inference(
        &self,
        request: Request<proto::InferenceRequest>,
    ) -> Result<Response<proto::InferenceResponse>, Status> {
        self.serve_inference(EMBEDDINGS_INFERENCE, request).await
    }

    async fn model_list(
        &self,
        _request: Request<proto::ModelListRequest>,
    ) -> Result<Response<proto::ModelListResponse>, Status> {
        self.serve_model_list(EMBEDDINGS_MODEL_LIST).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pangolin_embeddings_core::{
        Embedding, EmbeddingModel, ModelError, ModelRegistry, ModelRepository, ModelResult,
    };
    use std::sync::Arc;
    use tonic::Code;

    struct CharCountModel;

    #[async_trait]
    impl EmbeddingModel for CharCountModel {
        async fn encode(&self, text: &[String]) -> ModelResult<Vec<Embedding>> {
            Ok(text
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0])
                .collect())
        }
    }

    struct Repo;

    #[async_trait]
    impl ModelRepository for Repo {
        fn identifier(&self) -> &str {
            "test/models"
        }

        async fn resolve(&self, model_name: &str) -> ModelResult<Arc<dyn EmbeddingModel>> {
            if model_name == "all-MiniLM-L6-v2" {
                Ok(Arc::new(CharCountModel))
            } else {
                Err(ModelError::NotFound(model_name.to_string()))
            }
        }
    }

    async fn service() -> EmbeddingsGrpcService {
        let registry = ModelRegistry::new(["all-MiniLM-L6-v2"], &Repo).await.unwrap();
        EmbeddingsGrpcService::new(EmbeddingHandler::new(registry))
    }

    #[test]
    fn test_service_names() {
        assert_eq!(
            EmbeddingsGrpcService::service_names(),
            [
                "pangolin.embeddings.v1.SentenceTransformers",
                "pangolin.embeddings.v1.Embeddings"
            ]
        );
    }

    #[tokio::test]
    async fn test_both_variants_share_registry() {
        let service = service().await;
        let request = || {
            Request::new(proto::InferenceRequest {
                text: vec!["lorem ipsum".to_string()],
                model_name: "all-MiniLM-L6-v2".to_string(),
            })
        };

        let a = SentenceTransformers::inference(&service, request())
            .await
            .unwrap()
            .into_inner();
        let b = Embeddings::inference(&service, request())
            .await
            .unwrap()
            .into_inner();

        assert_eq!(a, b);
        assert_eq!(a.embeddings[0].components, vec![11.0, 1.0]);
    }

    #[tokio::test]
    async fn test_unknown_model_is_invalid_argument() {
        let service = service().await;
        let status = SentenceTransformers::inference(
            &service,
            Request::new(proto::InferenceRequest {
                text: vec!["lorem ipsum".to_string()],
                model_name: "hello mum".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("hello mum"));
    }

    #[tokio::test]
    async fn test_abort_in_flight() {
        let service = service().await;
        service.clone().abort_in_flight();

        for _ in 0..200 {
            let status = Embeddings::inference(
                &service,
                Request::new(proto::InferenceRequest {
                    text: vec!["lorem ipsum".to_string()],
                    model_name: "all-MiniLM-L6-v2".to_string(),
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(status.code(), Code::Unavailable);
        }
    }

    #[tokio::test]
    async fn test_abort_wins_over_ready_call() {
        let service = service().await;
        let request = || {
            Request::new(proto::InferenceRequest {
                text: vec!["lorem ipsum".to_string()],
                model_name: "all-MiniLM-L6-v2".to_string(),
            })
        };

        assert!(SentenceTransformers::inference(&service, request()).await.is_ok());

        service.abort_in_flight();
        for _ in 0..50 {
            let status = SentenceTransformers::inference(&service, request())
                .await
                .unwrap_err();
            assert_eq!(status.code(), Code::Unavailable);
            assert_eq!(status.message(), "server is shutting down");
        }
    }

    #[tokio::test]
    async fn test_model_list() {
        let service = service().await;
        let response = Embeddings::model_list(&service, Request::new(proto::ModelListRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.model_names, vec!["all-MiniLM-L6-v2"]);
    }
}
