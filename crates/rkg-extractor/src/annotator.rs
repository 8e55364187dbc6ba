//! Rule-based linguistic annotator
//!
//! Segments, tokenizes and tags a document using the lexicon, then runs
//! noun-chunking and [`RuleBasedNer`] over the result.

use std::sync::Arc;

use tracing::{debug, info};

use rkg_core::config::AnnotatorConfig;
use rkg_core::Result;

use crate::document::{AnnotatedDocument, NounChunk, PosTag, Token};
use crate::lexicon::Lexicon;
use crate::ner::RuleBasedNer;
use crate::tokenize::{split_sentences, token_spans};
use crate::LinguisticAnnotator;

/// Longest noun chunk, in tokens
const MAX_CHUNK_TOKENS: usize = 6;

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ive", "able", "ible", "ful", "less", "al", "ic"];

/// Lexicon-driven annotator
pub struct RuleBasedAnnotator {
    lexicon: Arc<Lexicon>,
    ner: RuleBasedNer,
}

impl RuleBasedAnnotator {
    pub fn new(lexicon: Lexicon) -> Self {
        let lexicon = Arc::new(lexicon);
        Self {
            ner: RuleBasedNer::new(Arc::clone(&lexicon)),
            lexicon,
        }
    }

    /// Load the built-in lexicon, extended by the configured file
    pub fn load(config: &AnnotatorConfig) -> Result<Self> {
        let lexicon = Lexicon::load(config.lexicon_path.as_deref())?;
        info!(
            lexicon = ?config.lexicon_path,
            given_names = lexicon.given_names.len(),
            places = lexicon.places.len(),
            "Loaded annotator lexicon"
        );
        Ok(Self::new(lexicon))
    }

    /// Coarse part-of-speech tag for one token
    fn tag(&self, token: &str, sentence_initial: bool) -> PosTag {
        let lex = &self.lexicon;

        if !token.chars().any(char::is_alphanumeric) {
            return PosTag::Punct;
        }
        if token.starts_with(['\'', '\u{2019}']) {
            return PosTag::Other;
        }
        let numeric = token.chars().any(|c| c.is_ascii_digit())
            && token
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '%' | '$' | '+'));
        if numeric {
            return PosTag::Number;
        }

        let lower = token.to_lowercase();
        if lower == "i" {
            return PosTag::Pronoun;
        }

        let capitalized = token.chars().next().is_some_and(char::is_uppercase);
        let inner_caps = token.chars().skip(1).any(char::is_uppercase);

        if (capitalized && !sentence_initial) || inner_caps {
            if lex.determiners.contains(&lower) {
                return PosTag::Determiner;
            }
            if lex.prepositions.contains(&lower) {
                return PosTag::Preposition;
            }
            if lex.conjunctions.contains(&lower) {
                return PosTag::Conjunction;
            }
            return PosTag::ProperNoun;
        }

        if lex.determiners.contains(&lower) {
            return PosTag::Determiner;
        }
        if lex.prepositions.contains(&lower) {
            return PosTag::Preposition;
        }
        if lex.conjunctions.contains(&lower) {
            return PosTag::Conjunction;
        }
        if lex.pronouns.contains(&lower) {
            return PosTag::Pronoun;
        }
        if lex.auxiliaries.contains(&lower) || lex.verbs.contains(&lower) {
            return PosTag::Verb;
        }

        if lower.chars().count() > 4 {
            if lower.ends_with("ly") {
                return PosTag::Adverb;
            }
            if lower.ends_with("ing") || lower.ends_with("ed") {
                return PosTag::Verb;
            }
            if ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
                return PosTag::Adjective;
            }
        }

        if capitalized {
            PosTag::ProperNoun
        } else {
            PosTag::Noun
        }
    }

    /// `(ADJ)* (NOUN|PROPN)+` spans within each sentence
    fn noun_chunks(&self, text: &str, sentence_tokens: &[&Token]) -> Vec<NounChunk> {
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < sentence_tokens.len() {
            let start = i;
            while i < sentence_tokens.len() && sentence_tokens[i].pos == PosTag::Adjective {
                i += 1;
            }
            let nouns_start = i;
            while i < sentence_tokens.len()
                && sentence_tokens[i].pos.is_noun()
                && i - start < MAX_CHUNK_TOKENS
            {
                i += 1;
            }

            if i > nouns_start {
                let (first, last) = (sentence_tokens[start], sentence_tokens[i - 1]);
                chunks.push(NounChunk {
                    text: text[first.start..last.end].to_string(),
                    start: first.start,
                    end: last.end,
                });
            } else if i == start {
                i += 1;
            }
        }

        chunks
    }
}

impl LinguisticAnnotator for RuleBasedAnnotator {
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument> {
        let sentences = split_sentences(text, &self.lexicon.abbreviations);

        let mut tokens = Vec::new();
        for (sentence_idx, sentence) in sentences.iter().enumerate() {
            for (n, (start, end)) in token_spans(&sentence.text).into_iter().enumerate() {
                let token_text = &sentence.text[start..end];
                let initial = n == 0 || is_after_bullet(&tokens, sentence_idx, n);
                tokens.push(Token {
                    text: token_text.to_string(),
                    start: sentence.start + start,
                    end: sentence.start + end,
                    sentence_idx,
                    pos: self.tag(token_text, initial),
                });
            }
        }

        let mut document = AnnotatedDocument {
            text: text.to_string(),
            sentences,
            tokens,
            ..Default::default()
        };

        document.noun_chunks = document
            .tokens_by_sentence()
            .iter()
            .flat_map(|sentence_tokens| self.noun_chunks(text, sentence_tokens))
            .collect();
        document.entities = self
            .ner
            .recognize(text, &document.sentences, &document.tokens);

        debug!(
            sentences = document.sentences.len(),
            tokens = document.tokens.len(),
            entities = document.entities.len(),
            noun_chunks = document.noun_chunks.len(),
            "Annotated document"
        );

        Ok(document)
    }
}

/// Whether the `n`th token of a sentence directly follows a leading bullet
fn is_after_bullet(tokens: &[Token], sentence_idx: usize, n: usize) -> bool {
    n == 1
        && tokens
            .last()
            .is_some_and(|t| t.sentence_idx == sentence_idx && t.pos == PosTag::Punct)
}
