//! RKG Vector - Embedding providers
//!
//! Maps short terms (seed skills and mined candidates) into a shared vector
//! space. Every provider returns L2-normalized vectors so that a dot product
//! is the cosine similarity.

use std::sync::Arc;

use rkg_core::{EmbeddingConfig, EmbeddingProvider, Result};
use tracing::{error, info};

pub mod embedding;
pub mod hashing;

pub use embedding::OllamaEmbedder;
#[cfg(feature = "fastembed")]
pub use embedding::FastEmbedder;
pub use hashing::HashingEmbedder;

/// Trait for embedding generation.
///
/// Implementations are loaded once and then shared read-only.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one normalized vector per input, in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimension
    fn dimension(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Scale a vector to unit length. Zero vectors are left untouched.
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

/// Dot product; equals cosine similarity for normalized inputs
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Create an embedder from config.
///
/// A provider that cannot load its model is a fatal initialization error.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Result<Arc<dyn Embedder>> = match config.provider {
        EmbeddingProvider::Hashing => HashingEmbedder::new(config.dimension)
            .map(|e| Arc::new(e) as Arc<dyn Embedder>),
        EmbeddingProvider::Ollama => {
            OllamaEmbedder::from_config(config).map(|e| Arc::new(e) as Arc<dyn Embedder>)
        }
        #[cfg(feature = "fastembed")]
        EmbeddingProvider::FastEmbed => {
            FastEmbedder::new(&config.model).map(|e| Arc::new(e) as Arc<dyn Embedder>)
        }
        #[cfg(not(feature = "fastembed"))]
        EmbeddingProvider::FastEmbed => Err(rkg_core::RkgError::ModelLoad(
            "fastembed provider requires the `fastembed` feature".to_string(),
        )),
    };

    match &embedder {
        Ok(embedder) => info!(
            provider = ?config.provider,
            embedder = embedder.name(),
            dimension = embedder.dimension(),
            "Embedding provider ready"
        ),
        Err(e) => error!(
            provider = ?config.provider,
            model = %config.model,
            error = %e,
            "Embedding provider failed to load"
        ),
    }
    embedder
}
