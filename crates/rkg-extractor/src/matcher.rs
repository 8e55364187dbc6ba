//! Phrase matcher
//!
//! Confirms literal, sentence-scoped occurrences of vocabulary terms.
//! Terms and sentences are tokenized the same way and compared
//! case-insensitively, token by token.

use std::collections::{BTreeSet, HashMap};

use crate::document::AnnotatedDocument;
use crate::tokenize::tokenize;

/// Compiled matcher for one vocabulary
#[derive(Debug, Clone, Default)]
pub struct SkillMatcher {
    /// first token -> (pattern tokens, vocabulary term)
    patterns: HashMap<String, Vec<(Vec<String>, String)>>,
    size: usize,
}

impl SkillMatcher {
    /// Compile one pattern per term; blank terms are skipped
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let mut matcher = Self::default();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            let tokens: Vec<String> = tokenize(&term).into_iter().map(str::to_string).collect();
            let Some(first) = tokens.first().cloned() else {
                continue;
            };
            matcher.patterns.entry(first).or_default().push((tokens, term));
            matcher.size += 1;
        }
        matcher
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Terms found within a single sentence's tokens
    pub fn match_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> BTreeSet<String> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut hits = BTreeSet::new();

        for (i, token) in lowered.iter().enumerate() {
            let Some(candidates) = self.patterns.get(token) else {
                continue;
            };
            for (pattern, term) in candidates {
                if lowered[i..].starts_with(pattern) {
                    hits.insert(term.clone());
                }
            }
        }

        hits
    }

    /// Terms found in any sentence of the document
    pub fn find_matches(&self, doc: &AnnotatedDocument) -> BTreeSet<String> {
        doc.tokens_by_sentence()
            .iter()
            .flat_map(|sentence| {
                let texts: Vec<&str> = sentence.iter().map(|t| t.text.as_str()).collect();
                self.match_tokens(&texts)
            })
            .collect()
    }
}
