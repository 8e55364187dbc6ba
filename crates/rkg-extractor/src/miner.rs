//! Candidate miner
//!
//! Collects plausible skill terms from a document: noun chunks, single
//! noun tokens, and every 2- and 3-word window of each line. Precision is
//! left to the vocabulary expander.

use std::collections::BTreeSet;

use crate::document::AnnotatedDocument;
use crate::text::strip_bullets_and_noise;

const MIN_CHARS: usize = 2;
const MAX_CHARS: usize = 40;

/// Punctuation trimmed from n-gram words
const NGRAM_TRIM: &[char] = &[',', '.', ';', ':', '(', ')', '[', ']', '{', '}', ' '];

/// Mine lowercase, normalized candidate terms from an annotated document
pub fn mine_candidates(doc: &AnnotatedDocument) -> BTreeSet<String> {
    let mut raw: Vec<String> = Vec::new();

    for chunk in &doc.noun_chunks {
        let len = chunk.text.trim().chars().count();
        if (MIN_CHARS..=MAX_CHARS).contains(&len) {
            raw.push(chunk.text.trim().to_string());
        }
    }

    for token in &doc.tokens {
        if token.pos.is_noun() && token.is_alpha() && token.text.chars().count() > 2 {
            raw.push(token.text.clone());
        }
    }

    for line in doc.text.lines() {
        raw.extend(line_ngrams(line));
    }

    raw.iter()
        .map(|c| strip_bullets_and_noise(c).to_lowercase())
        .filter(|c| is_valid_candidate(c))
        .collect()
}

/// Contiguous 2- and 3-word windows of one line, built from words with
/// surrounding punctuation trimmed. Words that are pure punctuation drop out.
fn line_ngrams(line: &str) -> Vec<String> {
    let words: Vec<&str> = line
        .split_whitespace()
        .map(|w| w.trim_matches(NGRAM_TRIM))
        .filter(|w| !w.is_empty())
        .collect();
    let mut grams = Vec::new();

    for n in 2..=3 {
        for window in words.windows(n) {
            let gram = window.join(" ");
            let len = gram.chars().count();
            if (3..=MAX_CHARS).contains(&len) {
                grams.push(gram);
            }
        }
    }

    grams
}

fn is_valid_candidate(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (MIN_CHARS..=MAX_CHARS).contains(&len) && candidate.chars().any(char::is_alphabetic)
}
