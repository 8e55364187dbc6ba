//! Skill vocabulary expansion
//!
//! Grows a seed skill list into a document-specific vocabulary by promoting
//! mined candidates whose embedding is close to some seed.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use rkg_core::{ExtractionConfig, Result};
use rkg_vector::{dot, Embedder};

/// Lowercase, trim and deduplicate seeds, keeping first-seen order
pub fn normalize_seeds<S: AsRef<str>>(seeds: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    seeds
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Ordered unique lowercase skills: seeds first, then promoted candidates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SkillVocabulary {
    terms: Vec<String>,
    seed_count: usize,
}

impl SkillVocabulary {
    /// Vocabulary holding only the (normalized) seeds
    pub fn from_seeds<S: AsRef<str>>(seeds: &[S]) -> Self {
        let terms = normalize_seeds(seeds);
        Self {
            seed_count: terms.len(),
            terms,
        }
    }

    fn with_promoted(mut self, promoted: impl IntoIterator<Item = String>) -> Self {
        for term in promoted {
            if !self.contains(&term) {
                self.terms.push(term);
            }
        }
        self
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn seeds(&self) -> &[String] {
        &self.terms[..self.seed_count]
    }

    pub fn promoted(&self) -> &[String] {
        &self.terms[self.seed_count..]
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Embedding-similarity expander
pub struct VocabularyExpander {
    embedder: Arc<dyn Embedder>,
    threshold: f32,
    max_promoted: usize,
}

impl VocabularyExpander {
    pub fn new(embedder: Arc<dyn Embedder>, config: &ExtractionConfig) -> Self {
        Self {
            embedder,
            threshold: config.similarity_threshold,
            max_promoted: config.max_promoted,
        }
    }

    /// Expand `seeds` with the closest `candidates`.
    ///
    /// Never fails: when nothing qualifies, or the embedder errors, the
    /// vocabulary is the seed list alone.
    pub fn expand<S: AsRef<str>>(&self, seeds: &[S], candidates: &BTreeSet<String>) -> SkillVocabulary {
        let vocabulary = SkillVocabulary::from_seeds(seeds);
        let seed_set: HashSet<&str> = vocabulary.seeds().iter().map(String::as_str).collect();
        let fresh: Vec<String> = candidates
            .iter()
            .filter(|c| !seed_set.contains(c.as_str()))
            .cloned()
            .collect();

        if vocabulary.is_empty() || fresh.is_empty() || self.max_promoted == 0 {
            return vocabulary;
        }

        let mut scored = match self.score(vocabulary.seeds(), fresh) {
            Ok(scored) => scored,
            Err(e) => {
                warn!(
                    embedder = self.embedder.name(),
                    error = %e,
                    "Embedding failed, keeping seed vocabulary"
                );
                return vocabulary;
            }
        };

        // stable: equal scores keep the lexicographic candidate order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.max_promoted);

        debug!(
            seeds = vocabulary.seeds().len(),
            candidates = candidates.len(),
            promoted = scored.len(),
            "Expanded skill vocabulary"
        );

        vocabulary.with_promoted(scored.into_iter().map(|(term, _)| term))
    }

    /// Candidates at or above the threshold with their best seed similarity
    fn score(&self, seeds: &[String], candidates: Vec<String>) -> Result<Vec<(String, f32)>> {
        let seed_vectors = self.embedder.embed(seeds)?;
        let candidate_vectors = self.embedder.embed(&candidates)?;

        Ok(candidates
            .into_iter()
            .zip(candidate_vectors)
            .filter_map(|(candidate, vector)| {
                let best = seed_vectors
                    .iter()
                    .map(|seed| dot(seed, &vector))
                    .fold(f32::NEG_INFINITY, f32::max);
                (best >= self.threshold).then_some((candidate, best))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rkg_core::RkgError;
    use rkg_vector::HashingEmbedder;

    /// Embeds by exact lookup so scores are controlled by the test
    struct TableEmbedder(Vec<(&'static str, Vec<f32>)>);

    impl Embedder for TableEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.0
                        .iter()
                        .find(|(k, _)| k == t)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| vec![0.0, 0.0, 1.0])
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(RkgError::Embedding("offline".to_string()))
        }

        fn dimension(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn candidates(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config(threshold: f32, cap: usize) -> ExtractionConfig {
        ExtractionConfig::default()
            .with_threshold(threshold)
            .with_max_promoted(cap)
    }

    #[test]
    fn test_normalize_seeds() {
        assert_eq!(
            normalize_seeds(&[" Python", "docker", "PYTHON", "", "Rust "]),
            vec!["python", "docker", "rust"]
        );
    }

    #[test]
    fn test_promotes_similar_candidates_after_seeds() {
        let embedder = Arc::new(TableEmbedder(vec![
            ("python", vec![1.0, 0.0, 0.0]),
            ("pandas", vec![0.8, 0.6, 0.0]),
            ("numpy", vec![0.9, 0.436, 0.0]),
        ]));
        let expander = VocabularyExpander::new(embedder, &config(0.55, 50));
        let vocab = expander.expand(&["Python"], &candidates(&["pandas", "numpy", "weather"]));

        assert_eq!(vocab.terms(), &["python", "numpy", "pandas"]);
        assert_eq!(vocab.seeds(), &["python"]);
        assert_eq!(vocab.promoted(), &["numpy", "pandas"]);
    }

    #[test]
    fn test_cap_and_lexicographic_tie_break() {
        let embedder = Arc::new(TableEmbedder(vec![
            ("rust", vec![1.0, 0.0, 0.0]),
            ("cargo", vec![0.8, 0.6, 0.0]),
            ("clippy", vec![0.8, 0.6, 0.0]),
            ("rustc", vec![0.8, 0.6, 0.0]),
        ]));
        let expander = VocabularyExpander::new(embedder, &config(0.5, 2));
        let vocab = expander.expand(&["rust"], &candidates(&["rustc", "clippy", "cargo"]));

        assert_eq!(vocab.promoted(), &["cargo", "clippy"]);
    }

    #[test]
    fn test_zero_cap_keeps_seeds_only() {
        let embedder = Arc::new(TableEmbedder(vec![
            ("rust", vec![1.0, 0.0, 0.0]),
            ("cargo", vec![1.0, 0.0, 0.0]),
        ]));
        let expander = VocabularyExpander::new(embedder, &config(0.5, 0));
        let vocab = expander.expand(&["rust"], &candidates(&["cargo"]));

        assert_eq!(vocab.terms(), &["rust"]);
        assert!(vocab.contains("rust"));
        assert!(!vocab.contains("cargo"));
    }

    #[test]
    fn test_seed_candidates_do_not_use_cap() {
        let embedder = Arc::new(TableEmbedder(vec![
            ("rust", vec![1.0, 0.0, 0.0]),
            ("cargo", vec![0.8, 0.6, 0.0]),
        ]));
        let expander = VocabularyExpander::new(embedder, &config(0.5, 1));
        let vocab = expander.expand(&["rust"], &candidates(&["rust", "cargo"]));

        assert_eq!(vocab.terms(), &["rust", "cargo"]);
    }

    #[test]
    fn test_nothing_passes_threshold() {
        let embedder = Arc::new(HashingEmbedder::default());
        let expander = VocabularyExpander::new(embedder, &config(0.55, 50));
        let vocab = expander.expand(&["python", "docker"], &candidates(&["weather", "sunny today"]));

        assert_eq!(vocab.terms(), &["python", "docker"]);
        assert!(vocab.promoted().is_empty());
    }

    #[test]
    fn test_embedding_failure_falls_back_to_seeds() {
        let expander = VocabularyExpander::new(Arc::new(FailingEmbedder), &config(0.55, 50));
        let vocab = expander.expand(&["python"], &candidates(&["pandas"]));
        assert_eq!(vocab.terms(), &["python"]);
    }

    #[test]
    fn test_empty_seeds_promote_nothing() {
        let expander = VocabularyExpander::new(Arc::new(HashingEmbedder::default()), &config(0.0, 50));
        let vocab = expander.expand::<&str>(&[], &candidates(&["python"]));
        assert!(vocab.is_empty());
    }
}
