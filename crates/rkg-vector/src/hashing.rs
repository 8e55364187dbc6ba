//! Offline feature-hashing embedder
//!
//! Each text is decomposed into word tokens and boundary-marked character
//! trigrams. Features are hashed into a fixed number of buckets with a
//! hash-derived sign, then the vector is L2 normalized. Terms that share
//! surface structure ("docker" / "docker compose") land close together;
//! unrelated terms are near orthogonal. Fully deterministic.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rkg_core::{Result, RkgError};

use crate::{normalize, Embedder};

/// Weight of a whole-word feature relative to one trigram
const WORD_WEIGHT: f32 = 1.0;

/// Deterministic embedder needing no model files
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a new hashing embedder
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RkgError::ModelLoad(
                "hashing embedder dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Embed one text
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            self.add_feature(&mut vector, "w", word, WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for window in padded.windows(3) {
                let gram: String = window.iter().collect();
                self.add_feature(&mut vector, "c", &gram, 1.0);
            }
        }

        normalize(vector)
    }

    fn add_feature(&self, vector: &mut [f32], kind: &str, feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        feature.hash(&mut hasher);
        let h = hasher.finish();

        let index = (h % self.dimension as u64) as usize;
        let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
        vector[index] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dot;
    use proptest::prelude::*;

    fn sim(embedder: &HashingEmbedder, a: &str, b: &str) -> f32 {
        dot(&embedder.embed_one(a), &embedder.embed_one(b))
    }

    #[test]
    fn test_identical_terms_have_unit_similarity() {
        let embedder = HashingEmbedder::default();
        assert!((sim(&embedder, "docker", "Docker") - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_related_terms_are_close() {
        let embedder = HashingEmbedder::default();
        assert!(sim(&embedder, "docker", "docker compose") >= 0.55);
    }

    #[test]
    fn test_unrelated_terms_are_far() {
        let embedder = HashingEmbedder::default();
        assert!(sim(&embedder, "python", "weather") < 0.3);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::default();
        assert!(embedder.embed_one("   ").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["python".to_string(), "kafka".to_string()];
        let vectors = embedder.embed(&texts).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], embedder.embed_one("python"));
        assert_eq!(vectors[1], embedder.embed_one("kafka"));
    }

    proptest! {
        #[test]
        fn prop_vectors_are_normalized(text in "[a-z]{1,12}( [a-z]{1,12}){0,3}") {
            let embedder = HashingEmbedder::default();
            let v = embedder.embed_one(&text);
            let norm = dot(&v, &v).sqrt();
            prop_assert!((norm - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_embedding_is_deterministic(text in "\\PC{0,30}") {
            let embedder = HashingEmbedder::default();
            prop_assert_eq!(embedder.embed_one(&text), embedder.embed_one(&text));
        }
    }
}
