//! Remote model repository for the Pangolin embeddings service
//!
//! This crate resolves model names against the Hugging Face hub and serves
//! encode calls through a feature-extraction inference endpoint:
//! - [`HubConfig`] - endpoints, organization, token and timeouts
//! - [`HubRepository`] - a [`ModelRepository`] that checks the hub's model cards
//! - [`HubModel`] - an [`EmbeddingModel`] backed by the inference endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use pangolin_embeddings_core::ModelRegistry;
//! use pangolin_embeddings_hub::{HubConfig, HubRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = HubRepository::new(HubConfig::new())?;
//! let registry = ModelRegistry::new(["all-MiniLM-L6-v2"], &repository).await?;
//! assert_eq!(registry.list_names(), &["all-MiniLM-L6-v2".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! [`ModelRepository`]: pangolin_embeddings_core::ModelRepository
//! [`EmbeddingModel`]: pangolin_embeddings_core::EmbeddingModel

pub mod config;
pub mod error;
pub mod model;
pub mod repository;

// Re-exports for convenience
pub use config::HubConfig;
pub use error::{HubError, HubResult};
pub use model::HubModel;
pub use repository::{HubRepository, ModelCard};
