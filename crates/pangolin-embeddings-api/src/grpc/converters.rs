//! Type converters between protobuf and domain types

use super::proto;
use pangolin_embeddings_core::Embedding;

// ============================================================================
// Domain -> Proto
// ============================================================================

impl From<Embedding> for proto::Vector {
    fn from(components: Embedding) -> Self {
        proto::Vector { components }
    }
}

impl From<Vec<Embedding>> for proto::InferenceResponse {
    fn from(embeddings: Vec<Embedding>) -> Self {
        proto::InferenceResponse {
            embeddings: embeddings.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<String>> for proto::ModelListResponse {
    fn from(model_names: Vec<String>) -> Self {
        proto::ModelListResponse { model_names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_response_keeps_order() {
        let response = proto::InferenceResponse::from(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[0].components, vec![1.0, 2.0]);
        assert_eq!(response.embeddings[1].components, vec![3.0]);
    }

    #[test]
    fn test_model_list_response() {
        let response = proto::ModelListResponse::from(vec!["all-MiniLM-L6-v2".to_string()]);
        assert_eq!(response.model_names, vec!["all-MiniLM-L6-v2"]);
    }
}
