//! Annotated document model
//!
//! Output of a [`crate::LinguisticAnnotator`]: sentences, tokens with coarse
//! part-of-speech tags, named-entity spans and noun chunks. All offsets are
//! byte offsets into the original text.

use serde::{Deserialize, Serialize};

/// Coarse part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Preposition,
    Pronoun,
    Conjunction,
    Number,
    Punct,
    Other,
}

impl PosTag {
    /// Common or proper noun
    pub fn is_noun(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

/// Named-entity labels produced by the annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NerLabel {
    Person,
    Org,
    /// Geo-political entity (country, city, state)
    Gpe,
    /// Non-political location (region, area)
    Loc,
    Date,
}

impl NerLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Date => "DATE",
        }
    }
}

impl std::fmt::Display for NerLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contiguous span of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A token inside one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub sentence_idx: usize,
    pub pos: PosTag,
}

impl Token {
    /// Whether every character is alphabetic
    pub fn is_alpha(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }
}

/// A labeled entity mention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub label: NerLabel,
    pub start: usize,
    pub end: usize,
}

/// A noun phrase: `(ADJ)* (NOUN|PROPN)+`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounChunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Fully annotated document
#[derive(Debug, Clone, Default)]
pub struct AnnotatedDocument {
    pub text: String,
    pub sentences: Vec<Sentence>,
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
    pub noun_chunks: Vec<NounChunk>,
}

impl AnnotatedDocument {
    /// Tokens grouped per sentence, indexed like `sentences`
    pub fn tokens_by_sentence(&self) -> Vec<Vec<&Token>> {
        let mut grouped: Vec<Vec<&Token>> = vec![Vec::new(); self.sentences.len()];
        for token in &self.tokens {
            if let Some(group) = grouped.get_mut(token.sentence_idx) {
                group.push(token);
            }
        }
        grouped
    }

    /// Sentence texts in document order
    pub fn sentence_texts(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.text.as_str()).collect()
    }
}
