//! RKG Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults that work offline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Starting skill vocabulary used when the caller supplies none
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "c#",
    "sql",
    "pytorch",
    "tensorflow",
    "opencv",
    "transformers",
    "hugging face",
    "sklearn",
    "scikit-learn",
    "xgboost",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
    "spark",
    "hadoop",
    "airflow",
    "postgresql",
    "mongodb",
    "langchain",
    "streamlit",
    "flask",
    "fastapi",
    "grpc",
    "linux",
    "git",
    "kafka",
    "redis",
    "elastic",
    "neo4j",
    "d3",
    "react",
    "typescript",
    "node",
    "shap",
    "graphql",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction pipeline tuning
    pub extraction: ExtractionConfig,

    /// Embedding provider
    pub embedding: EmbeddingConfig,

    /// Linguistic annotator
    pub annotator: AnnotatorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Extraction
        if let Ok(skills) = std::env::var("RKG_SEED_SKILLS") {
            config.extraction.seed_skills = split_list(&skills);
        }
        if let Ok(value) = std::env::var("RKG_SIMILARITY_THRESHOLD") {
            config.extraction.similarity_threshold =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RKG_SIMILARITY_THRESHOLD".to_string(),
                    value,
                })?;
        }
        if let Ok(value) = std::env::var("RKG_MAX_PROMOTED") {
            config.extraction.max_promoted =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RKG_MAX_PROMOTED".to_string(),
                    value,
                })?;
        }

        // Annotator
        if let Ok(path) = std::env::var("RKG_LEXICON_PATH") {
            config.annotator.lexicon_path = Some(PathBuf::from(path));
        }

        // Embedding
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider.parse()?;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.embedding.ollama_url = url;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = matches!(json.as_str(), "1" | "true" | "yes");
        }

        config.extraction.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.extraction.seed_skills != defaults.extraction.seed_skills {
            self.extraction.seed_skills = env_config.extraction.seed_skills;
        }
        if env_config.extraction.similarity_threshold != defaults.extraction.similarity_threshold {
            self.extraction.similarity_threshold = env_config.extraction.similarity_threshold;
        }
        if env_config.extraction.max_promoted != defaults.extraction.max_promoted {
            self.extraction.max_promoted = env_config.extraction.max_promoted;
        }
        if env_config.annotator.lexicon_path.is_some() {
            self.annotator.lexicon_path = env_config.annotator.lexicon_path;
        }
        if env_config.embedding.provider != defaults.embedding.provider {
            self.embedding.provider = env_config.embedding.provider;
        }
        if env_config.embedding.model != defaults.embedding.model {
            self.embedding.model = env_config.embedding.model;
        }
        if env_config.embedding.ollama_url != defaults.embedding.ollama_url {
            self.embedding.ollama_url = env_config.embedding.ollama_url;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Seed skills expanded per document
    pub seed_skills: Vec<String>,

    /// Minimum cosine similarity for a candidate to be promoted
    pub similarity_threshold: f32,

    /// Maximum number of promoted candidates
    pub max_promoted: usize,

    /// Project lines are cut to this many characters
    pub project_line_max_chars: usize,

    /// Example sentences kept per edge
    pub evidence_examples: usize,

    /// Example sentences are cut to this many characters
    pub evidence_excerpt_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            seed_skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            similarity_threshold: 0.55,
            max_promoted: 50,
            project_line_max_chars: 140,
            evidence_examples: 2,
            evidence_excerpt_chars: 220,
        }
    }
}

impl ExtractionConfig {
    /// Replace the seed list
    pub fn with_seed_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set the promotion threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the promotion cap
    pub fn with_max_promoted(mut self, max_promoted: usize) -> Self {
        self.max_promoted = max_promoted;
        self
    }

    /// Reject values the pipeline cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "similarity_threshold".to_string(),
                value: self.similarity_threshold.to_string(),
            });
        }
        if self.project_line_max_chars == 0 || self.evidence_excerpt_chars == 0 {
            return Err(ConfigError::MissingRequired(
                "truncation limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider to use
    pub provider: EmbeddingProvider,

    /// Model name (fastembed / ollama)
    pub model: String,

    /// Ollama server URL
    pub ollama_url: String,

    /// Vector dimension for the hashing provider
    pub dimension: usize,

    /// Request timeout in seconds (remote providers)
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::FastEmbed,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            dimension: 384,
            timeout_secs: 60,
        }
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Offline feature-hashing embedder for tests and air-gapped runs
    Hashing,
    /// Local ONNX model via fastembed (default)
    FastEmbed,
    /// Ollama embeddings API
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "fastembed" => Ok(Self::FastEmbed),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "EMBEDDING_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Linguistic annotator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Extra lexicon (TOML) merged into the built-in one
    pub lexicon_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
