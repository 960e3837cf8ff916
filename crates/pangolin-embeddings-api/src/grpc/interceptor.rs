//! Error-translation interceptor
//!
//! Every RPC runs its handler through [`intercept`]. Successful calls log an
//! `OK` line; domain errors become their declared status and are logged with
//! the status token and detail. Anything else is logged in full and reported
//! to the client as `INTERNAL` without leaking internals.

use std::future::Future;
use tonic::{Response, Status};
use tracing::{error, info};

use crate::error::{domain_status, status_token, HandlerError, HandlerResult};

/// Run a handler call and translate its outcome into a gRPC response
pub async fn intercept<T, F>(method: &str, call: F) -> Result<Response<T>, Status>
where
    F: Future<Output = HandlerResult<T>>,
{
    match call.await {
        Ok(message) => {
            info!("{} OK", method);
            Ok(Response::new(message))
        }
        Err(err) => Err(translate(method, err)),
    }
}

/// Map a handler failure onto the status returned to the client
pub fn translate(method: &str, err: HandlerError) -> Status {
    match err {
        HandlerError::Domain(domain) => {
            let status = domain_status(&domain);
            error!(
                "{} {} - Details: {}",
                method,
                status_token(status.code()),
                status.message()
            );
            status
        }
        other => {
            error!(
                error = ?other,
                "{} {} - Details: {}",
                method,
                status_token(tonic::Code::Internal),
                other
            );
            Status::internal("Internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pangolin_embeddings_core::{EmbeddingError, ModelError};
    use tonic::Code;

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = intercept("Embeddings/ModelList", async { Ok(vec![1, 2, 3]) })
            .await
            .unwrap();
        assert_eq!(response.into_inner(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_domain_error_is_mapped() {
        let status = intercept::<(), _>("SentenceTransformers/Inference", async {
            Err(EmbeddingError::not_implemented("hello mum").into())
        })
        .await
        .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("hello mum"));
    }

    #[tokio::test]
    async fn test_other_errors_are_internal() {
        let status = intercept::<(), _>("SentenceTransformers/Inference", async {
            Err(ModelError::Transport("connection reset".to_string()).into())
        })
        .await
        .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("connection reset"));
    }
}
