//! Model-backed embedding clients
//!
//! Supports a local ONNX model (fastembed, behind the `fastembed` feature)
//! and the Ollama embeddings API.
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use reqwest::blocking::Client;
use rkg_core::{EmbeddingConfig, Result, RkgError};
use serde::{Deserialize, Serialize};

use crate::{normalize, Embedder};

// ============================================================================
// Ollama Embedding Client
// ============================================================================

/// Ollama embedding API client
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedding client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let model = model.into();
        let dimension = match model.as_str() {
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            "all-minilm" => 384,
            _ => 768, // Default for most models
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RkgError::ModelLoad(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            dimension,
        })
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Self::new(
            config.ollama_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| RkgError::Embedding(format!("Ollama embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(RkgError::Embedding(format!(
                "Ollama embedding error: {error_text}"
            )));
        }

        let result: OllamaEmbeddingResponse = response
            .json()
            .map_err(|e| RkgError::Embedding(format!("Failed to parse embedding response: {e}")))?;

        Ok(normalize(result.embedding))
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Ollama doesn't have native batch embedding, so we process sequentially
        texts.iter().map(|t| self.embed_one(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Local ONNX Embedding (fastembed)
// ============================================================================

#[cfg(feature = "fastembed")]
pub use local::FastEmbedder;

#[cfg(feature = "fastembed")]
mod local {
    use std::sync::Mutex;

    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use rkg_core::{Result, RkgError};
    use tracing::info;

    use crate::{normalize, Embedder};

    /// Local sentence embedder using fastembed-rs with ONNX models
    pub struct FastEmbedder {
        model: Mutex<TextEmbedding>,
        dimension: usize,
    }

    impl FastEmbedder {
        /// Load a model, downloading it on first use
        pub fn new(model_name: &str) -> Result<Self> {
            let (model, dimension) = Self::parse_model_name(model_name)?;
            info!(model = model_name, "Loading embedding model");

            let options = InitOptions::new(model).with_show_download_progress(false);
            let model = TextEmbedding::try_new(options)
                .map_err(|e| RkgError::ModelLoad(format!("{model_name}: {e}")))?;

            Ok(Self {
                model: Mutex::new(model),
                dimension,
            })
        }

        fn parse_model_name(model_name: &str) -> Result<(EmbeddingModel, usize)> {
            match model_name {
                "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
                    Ok((EmbeddingModel::AllMiniLML6V2, 384))
                }
                "sentence-transformers/all-MiniLM-L12-v2" | "all-MiniLM-L12-v2" => {
                    Ok((EmbeddingModel::AllMiniLML12V2, 384))
                }
                "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => {
                    Ok((EmbeddingModel::BGESmallENV15, 384))
                }
                "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => {
                    Ok((EmbeddingModel::BGEBaseENV15, 768))
                }
                other => Err(RkgError::ModelLoad(format!(
                    "unsupported fastembed model: {other}"
                ))),
            }
        }
    }

    impl Embedder for FastEmbedder {
        #[allow(unused_mut)]
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self
                .model
                .lock()
                .map_err(|_| RkgError::Embedding("embedding model lock poisoned".to_string()))?;
            let vectors = model
                .embed(texts.to_vec(), None)
                .map_err(|e| RkgError::Embedding(e.to_string()))?;
            Ok(vectors.into_iter().map(normalize).collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "fastembed"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_dimension() {
        let client = OllamaEmbedder::new(
            "http://localhost:11434",
            "nomic-embed-text",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.dimension(), 768);

        let client = OllamaEmbedder::new(
            "http://localhost:11434/",
            "mxbai-embed-large",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.dimension(), 1024);
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_ollama_from_config() {
        let config = EmbeddingConfig {
            model: "all-minilm".to_string(),
            ..Default::default()
        };
        let client = OllamaEmbedder::from_config(&config).unwrap();
        assert_eq!(client.dimension(), 384);
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_ollama_wire_format() {
        let request = OllamaEmbeddingRequest {
            model: "all-minilm",
            prompt: "rust",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"model": "all-minilm", "prompt": "rust"})
        );

        let response: OllamaEmbeddingResponse =
            serde_json::from_str(r#"{"embedding": [3.0, 4.0]}"#).unwrap();
        assert_eq!(response.embedding, vec![3.0, 4.0]);
    }

    #[test]
    fn test_ollama_empty_batch_makes_no_requests() {
        let client = OllamaEmbedder::new(
            "http://127.0.0.1:9",
            "all-minilm",
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client.embed(&[]).unwrap().is_empty());
    }
}
