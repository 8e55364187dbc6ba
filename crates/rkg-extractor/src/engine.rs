//! Extraction engine
//!
//! Session object owning the annotator, embedder, co-occurrence strategy and
//! extraction settings. Constructed once, then used for any number of
//! documents; every per-document structure is local to a call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use rkg_core::{
    AppConfig, EdgeEvidence, EdgeSet, EntityGroup, EntityMap, ExtractionConfig, GraphExport,
    Result,
};
use rkg_vector::{create_embedder, Embedder};

use crate::annotator::RuleBasedAnnotator;
use crate::classifier::EntityClassifier;
use crate::document::AnnotatedDocument;
use crate::matcher::SkillMatcher;
use crate::miner::mine_candidates;
use crate::relation::{RelationInferencer, SubstringCooccurrence};
use crate::vocabulary::{normalize_seeds, SkillVocabulary, VocabularyExpander};
use crate::{CooccurrencePredicate, LinguisticAnnotator};

/// Result of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub entities: EntityMap,
    pub edges: EdgeSet,
    pub evidence: Vec<EdgeEvidence>,
}

impl Analysis {
    /// Nodes and edges for rendering or export
    pub fn graph(&self) -> GraphExport {
        GraphExport::build(&self.entities, &self.edges)
    }
}

pub struct ExtractionEngine {
    annotator: Arc<dyn LinguisticAnnotator>,
    embedder: Arc<dyn Embedder>,
    cooccurrence: Arc<dyn CooccurrencePredicate>,
    config: ExtractionConfig,
}

impl ExtractionEngine {
    /// Create an engine; the seed list is normalized and the config validated
    pub fn new(
        annotator: Arc<dyn LinguisticAnnotator>,
        embedder: Arc<dyn Embedder>,
        mut config: ExtractionConfig,
    ) -> Result<Self> {
        config.validate()?;
        config.seed_skills = normalize_seeds(&config.seed_skills);
        Ok(Self {
            annotator,
            embedder,
            cooccurrence: Arc::new(SubstringCooccurrence),
            config,
        })
    }

    /// Load the annotator and embedder described by `config`.
    ///
    /// Model load failures are returned as [`rkg_core::RkgError::ModelLoad`].
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let annotator = Arc::new(RuleBasedAnnotator::load(&config.annotator)?);
        let embedder = create_embedder(&config.embedding)?;
        info!(
            embedder = embedder.name(),
            dimension = embedder.dimension(),
            seeds = config.extraction.seed_skills.len(),
            "Extraction engine ready"
        );
        Self::new(annotator, embedder, config.extraction.clone())
    }

    /// Replace the co-occurrence strategy
    pub fn with_cooccurrence(mut self, cooccurrence: Arc<dyn CooccurrencePredicate>) -> Self {
        self.cooccurrence = cooccurrence;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Default seeds used when a call does not supply its own
    pub fn seed_skills(&self) -> &[String] {
        &self.config.seed_skills
    }

    /// Replace the default seed list
    pub fn set_seed_skills<S: AsRef<str>>(&mut self, seeds: &[S]) {
        self.config.seed_skills = normalize_seeds(seeds);
        debug!(seeds = self.config.seed_skills.len(), "Seed skills updated");
    }

    /// Compile a phrase matcher for a term list
    pub fn build_skill_matcher<S: AsRef<str>>(&self, terms: &[S]) -> SkillMatcher {
        SkillMatcher::new(terms)
    }

    /// Seed list expanded with the document's closest candidates
    pub fn expand_vocabulary<S: AsRef<str>>(&self, text: &str, seeds: &[S]) -> Result<SkillVocabulary> {
        let doc = self.annotator.annotate(text)?;
        Ok(self.expand_in(&doc, seeds))
    }

    /// Classify a document into the eight entity groups.
    ///
    /// `seed_skills` overrides the engine's seeds when present and non-empty.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub fn extract_entities(&self, text: &str, seed_skills: Option<&[String]>) -> Result<EntityMap> {
        if text.trim().is_empty() {
            return Ok(EntityMap::new());
        }
        let doc = self.annotator.annotate(text)?;
        Ok(self.extract_in(&doc, seed_skills))
    }

    /// Edges between co-occurring entity values
    #[instrument(skip_all, fields(chars = text.len()))]
    pub fn infer_relationships(&self, text: &str, entities: &EntityMap) -> Result<EdgeSet> {
        let doc = self.annotator.annotate(text)?;
        Ok(self.inferencer().infer(&doc.sentence_texts(), entities))
    }

    /// Sentence counts and excerpts supporting each edge
    pub fn collect_edge_evidence(&self, text: &str, edges: &EdgeSet) -> Result<Vec<EdgeEvidence>> {
        let doc = self.annotator.annotate(text)?;
        Ok(self.evidence_in(&doc, edges))
    }

    /// Entities, edges and evidence for one document
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        self.analyze_with_groups(text, &EntityGroup::ALL)
    }

    /// Like [`ExtractionEngine::analyze`], with hidden groups emptied before
    /// relationship inference
    pub fn analyze_with_groups(&self, text: &str, visible: &[EntityGroup]) -> Result<Analysis> {
        let doc = self.annotator.annotate(text)?;
        let entities = if text.trim().is_empty() {
            EntityMap::new()
        } else {
            self.extract_in(&doc, None).retain_groups(visible)
        };
        let edges = self.inferencer().infer(&doc.sentence_texts(), &entities);
        let evidence = self.evidence_in(&doc, &edges);

        let analysis = Analysis {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            entities,
            edges,
            evidence,
        };
        info!(
            run_id = %analysis.run_id,
            entities = analysis.entities.total(),
            edges = analysis.edges.len(),
            "Analysis complete"
        );
        Ok(analysis)
    }

    fn expand_in<S: AsRef<str>>(&self, doc: &AnnotatedDocument, seeds: &[S]) -> SkillVocabulary {
        let candidates = mine_candidates(doc);
        debug!(candidates = candidates.len(), "Mined candidates");
        VocabularyExpander::new(Arc::clone(&self.embedder), &self.config).expand(seeds, &candidates)
    }

    fn extract_in(&self, doc: &AnnotatedDocument, seed_skills: Option<&[String]>) -> EntityMap {
        let seeds = match seed_skills {
            Some(seeds) if !seeds.is_empty() => seeds,
            _ => self.config.seed_skills.as_slice(),
        };
        let vocabulary = self.expand_in(doc, seeds);
        let matched = self.build_skill_matcher(vocabulary.terms()).find_matches(doc);
        debug!(
            vocabulary = vocabulary.len(),
            matched = matched.len(),
            "Matched skills"
        );

        EntityClassifier::new(self.config.project_line_max_chars).classify(doc, &matched, &vocabulary)
    }

    fn evidence_in(&self, doc: &AnnotatedDocument, edges: &EdgeSet) -> Vec<EdgeEvidence> {
        self.inferencer().collect_evidence(
            &doc.sentence_texts(),
            edges,
            self.config.evidence_examples,
            self.config.evidence_excerpt_chars,
        )
    }

    fn inferencer(&self) -> RelationInferencer {
        RelationInferencer::new(Arc::clone(&self.cooccurrence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::relation::TokenBoundaryCooccurrence;
    use rkg_core::{Edge, RelationType};
    use rkg_vector::HashingEmbedder;

    fn engine(seeds: &[&str]) -> ExtractionEngine {
        ExtractionEngine::new(
            Arc::new(RuleBasedAnnotator::new(Lexicon::builtin().unwrap())),
            Arc::new(HashingEmbedder::default()),
            ExtractionConfig::default().with_seed_skills(seeds.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ExtractionEngine::new(
            Arc::new(RuleBasedAnnotator::new(Lexicon::builtin().unwrap())),
            Arc::new(HashingEmbedder::default()),
            ExtractionConfig::default().with_threshold(1.5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_skills_normalized_and_replaceable() {
        let mut engine = engine(&["Python", " docker", "python"]);
        assert_eq!(engine.seed_skills(), &["python", "docker"]);

        engine.set_seed_skills(&["Rust"]);
        assert_eq!(engine.seed_skills(), &["rust"]);
    }

    #[test]
    fn test_empty_override_uses_engine_seeds() {
        let engine = engine(&["rust"]);
        let empty: Vec<String> = Vec::new();
        let map = engine
            .extract_entities("Wrote Rust services.", Some(empty.as_slice()))
            .unwrap();
        assert!(map.get(EntityGroup::Skills).contains(&"rust".to_string()));
    }

    #[test]
    fn test_build_skill_matcher() {
        let engine = engine(&[]);
        let matcher = engine.build_skill_matcher(&["python", "machine learning"]);
        assert_eq!(matcher.len(), 2);
        let hits = matcher.match_tokens(&["Applied", "Machine", "Learning"]);
        assert!(hits.contains("machine learning"));
    }

    #[test]
    fn test_expand_vocabulary_keeps_seeds_first() {
        let engine = engine(&["docker"]);
        let vocab = engine
            .expand_vocabulary("Deployed services with Docker Compose.", &["docker"])
            .unwrap();
        assert_eq!(vocab.seeds(), &["docker"]);
        assert!(vocab.promoted().iter().any(|t| t.contains("docker")), "{vocab:?}");
    }

    #[test]
    fn test_cooccurrence_strategy_is_swappable() {
        let text = "Maintained the build system.";
        let entities = EntityMap::new()
            .with_group(EntityGroup::Projects, vec!["Maintained the build system.".into()])
            .with_group(EntityGroup::Skills, vec!["ai".into()]);
        let project = "Maintained the build system.";

        let loose = engine(&[]).infer_relationships(text, &entities).unwrap();
        assert!(loose.contains(&Edge::new(project, RelationType::Uses, "ai")));

        let strict = engine(&[])
            .with_cooccurrence(Arc::new(TokenBoundaryCooccurrence))
            .infer_relationships(text, &entities)
            .unwrap();
        assert!(strict.is_empty());
    }

    #[test]
    fn test_analyze_with_hidden_groups() {
        let engine = engine(&["python", "docker"]);
        let text = "Jane Doe built a pipeline using Python and Docker at Acme Corp.";
        let analysis = engine
            .analyze_with_groups(text, &[EntityGroup::People, EntityGroup::Skills])
            .unwrap();

        assert!(analysis.entities.get(EntityGroup::Orgs).is_empty());
        assert!(analysis.edges.is_empty());
        assert!(analysis.evidence.is_empty());
        assert_eq!(analysis.entities.get(EntityGroup::People), &["Jane Doe"]);
    }

    #[test]
    fn test_analysis_graph_and_serialization() {
        let engine = engine(&["python", "docker"]);
        let analysis = engine
            .analyze("Jane Doe built a pipeline using Python and Docker at Acme Corp.")
            .unwrap();

        let graph = analysis.graph();
        assert!(graph.nodes.iter().any(|n| n.id == "Jane Doe"));
        assert_eq!(graph.edges.len(), analysis.edges.len());

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["run_id"].is_string());
        assert!(json["entities"]["PEOPLE"].is_array());
    }
}
