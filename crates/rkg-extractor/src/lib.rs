//! RKG Extractor - Entity extraction and relationship inference
//!
//! Pipeline, leaves first:
//! - Linguistic annotation (sentences, tokens, POS tags, entity spans)
//! - Candidate mining (noun chunks, noun tokens, line n-grams)
//! - Skill vocabulary expansion by embedding similarity
//! - Phrase matching of the vocabulary against sentences
//! - Entity classification, normalization and conflict resolution
//! - Relationship inference by sentence co-occurrence, with evidence
//!
//! [`ExtractionEngine`] ties the stages together.

use rkg_core::Result;

pub mod annotator;
pub mod classifier;
pub mod document;
pub mod engine;
pub mod lexicon;
pub mod matcher;
pub mod miner;
pub mod ner;
pub mod relation;
pub mod text;
pub mod tokenize;
pub mod vocabulary;

pub use annotator::RuleBasedAnnotator;
pub use classifier::EntityClassifier;
pub use document::{AnnotatedDocument, EntitySpan, NerLabel, NounChunk, PosTag, Sentence, Token};
pub use engine::{Analysis, ExtractionEngine};
pub use lexicon::Lexicon;
pub use matcher::SkillMatcher;
pub use relation::{
    RelationInferencer, RelationRule, SubstringCooccurrence, TokenBoundaryCooccurrence,
    RELATION_RULES,
};
pub use vocabulary::{SkillVocabulary, VocabularyExpander};

/// Trait for linguistic annotators
pub trait LinguisticAnnotator: Send + Sync {
    /// Segment, tokenize, tag and recognize entities in `text`
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument>;
}

/// Decides whether two entity values appear in the same sentence.
///
/// All arguments are already lowercased.
pub trait CooccurrencePredicate: Send + Sync {
    fn both_in(&self, sentence: &str, a: &str, b: &str) -> bool;

    /// Strategy name for logging
    fn name(&self) -> &str;
}
