//! Sentence segmentation and tokenization
//!
//! Sentences partition the text: every byte belongs to exactly one
//! sentence, and whitespace between sentences is attached to the sentence
//! before it. Boundaries are line breaks and terminal punctuation followed
//! by whitespace and a sentence-like start.

use std::collections::HashSet;

use crate::document::Sentence;
use crate::text::is_bullet;

/// Characters kept at the start of a token ("#hashtag", "@handle", "$100")
const KEEP_LEADING: &[char] = &['#', '@', '$'];
/// Characters kept at the end of a token ("c#", "c++")
const KEEP_TRAILING: &[char] = &['#', '+'];
/// Closing characters that may follow terminal punctuation
const CLOSERS: &[char] = &['.', '!', '?', '"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

/// Split text into sentences covering the whole input
pub fn split_sentences(text: &str, abbreviations: &HashSet<String>) -> Vec<Sentence> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let offset = |idx: usize| chars.get(idx).map(|(o, _)| *o).unwrap_or(text.len());

    let mut bounds = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];

        if c == '\n' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            bounds.push(offset(j));
            i = j;
            continue;
        }

        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                j += 1;
            }
            if j < chars.len() && chars[j].1.is_whitespace() {
                let mut k = j;
                while k < chars.len() && chars[k].1.is_whitespace() && chars[k].1 != '\n' {
                    k += 1;
                }
                let splits = k < chars.len()
                    && chars[k].1 != '\n'
                    && starts_sentence(chars[k].1)
                    && !(c == '.' && is_abbreviation(text, pos, abbreviations));
                if splits {
                    bounds.push(offset(k));
                    i = k;
                    continue;
                }
            }
            i = j;
            continue;
        }

        i += 1;
    }
    bounds.push(text.len());

    let mut sentences: Vec<Sentence> = Vec::new();
    let mut start = 0;
    for end in bounds {
        if end <= start {
            continue;
        }
        let slice = &text[start..end];
        if slice.trim().is_empty() {
            // leading whitespace waits for the next sentence
            if let Some(last) = sentences.last_mut() {
                last.end = end;
                last.text.push_str(slice);
                start = end;
            }
            continue;
        }
        sentences.push(Sentence {
            start,
            end,
            text: slice.to_string(),
        });
        start = end;
    }

    if start < text.len() {
        sentences.push(Sentence {
            start,
            end: text.len(),
            text: text[start..].to_string(),
        });
    }

    sentences
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase()
        || c.is_numeric()
        || is_bullet(c)
        || matches!(c, '"' | '(' | '\'' | '\u{201C}')
}

/// Whether the word ending at the `.` at byte `dot` is an abbreviation or initial
fn is_abbreviation(text: &str, dot: usize, abbreviations: &HashSet<String>) -> bool {
    let before = &text[..dot];
    let word_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '.'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let word = &before[word_start..];
    if word.is_empty() {
        return false;
    }
    let single_initial = word.chars().count() == 1 && word.chars().all(char::is_uppercase);
    single_initial || abbreviations.contains(&word.to_lowercase())
}

/// Byte spans of the tokens in `text`
pub fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut chunk_start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), chunk_start) {
            (true, Some(start)) => {
                split_chunk(&text[start..i], start, &mut spans);
                chunk_start = None;
            }
            (false, None) => chunk_start = Some(i),
            _ => {}
        }
    }
    if let Some(start) = chunk_start {
        split_chunk(&text[start..], start, &mut spans);
    }

    spans
}

/// Token texts of `text`
pub fn tokenize(text: &str) -> Vec<&str> {
    token_spans(text)
        .into_iter()
        .map(|(s, e)| &text[s..e])
        .collect()
}

fn split_chunk(chunk: &str, offset: usize, spans: &mut Vec<(usize, usize)>) {
    let mut core = chunk;
    let mut core_start = offset;

    // leading punctuation becomes separate tokens
    loop {
        let mut chars = core.chars();
        let Some(c) = chars.next() else { break };
        if c.is_alphanumeric() || KEEP_LEADING.contains(&c) {
            break;
        }
        if c == '.' && chars.next().is_some_and(char::is_alphanumeric) {
            break;
        }
        let n = c.len_utf8();
        spans.push((core_start, core_start + n));
        core_start += n;
        core = &core[n..];
    }

    // trailing punctuation, collected right to left
    let mut trailing = Vec::new();
    while let Some(c) = core.chars().last() {
        if c.is_alphanumeric() || KEEP_TRAILING.contains(&c) {
            break;
        }
        let n = core.len() - c.len_utf8();
        trailing.push((core_start + n, core_start + core.len()));
        core = &core[..n];
    }

    if !core.is_empty() {
        let possessive = ["'s", "'S", "\u{2019}s"]
            .iter()
            .find(|suffix| core.len() > suffix.len() && core.ends_with(*suffix))
            .map(|suffix| suffix.len());
        match possessive {
            Some(n) => {
                let split = core_start + core.len() - n;
                spans.push((core_start, split));
                spans.push((split, core_start + core.len()));
            }
            None => spans.push((core_start, core_start + core.len())),
        }
    }

    spans.extend(trailing.into_iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn abbreviations() -> HashSet<String> {
        ["dr", "e.g", "etc"].iter().map(|s| s.to_string()).collect()
    }

    fn texts(text: &str) -> Vec<String> {
        split_sentences(text, &abbreviations())
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_split_on_terminal_punctuation() {
        assert_eq!(
            texts("Jane built it. She shipped it!"),
            vec!["Jane built it. ", "She shipped it!"]
        );
    }

    #[test]
    fn test_split_on_newlines() {
        assert_eq!(
            texts("Jane Doe\nSkills: Python\n\nAcme Corp"),
            vec!["Jane Doe\n", "Skills: Python\n\n", "Acme Corp"]
        );
    }

    #[test]
    fn test_no_split_inside_tokens_or_lowercase_continuations() {
        assert_eq!(texts("Used node.js and v2.5 daily."), vec!["Used node.js and v2.5 daily."]);
        assert_eq!(texts("Worked at Acme Corp. in Berlin."), vec!["Worked at Acme Corp. in Berlin."]);
    }

    #[test]
    fn test_no_split_after_abbreviation_or_initial() {
        assert_eq!(texts("Met Dr. Smith there."), vec!["Met Dr. Smith there."]);
        assert_eq!(texts("By J. Smith today."), vec!["By J. Smith today."]);
    }

    #[test]
    fn test_leading_whitespace_joins_first_sentence() {
        let sentences = split_sentences("\n\n  Jane Doe", &abbreviations());
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].start, 0);
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(split_sentences("", &abbreviations()).is_empty());
        assert_eq!(split_sentences("   ", &abbreviations()).len(), 1);
    }

    #[test]
    fn test_tokenize_punctuation_and_skills() {
        assert_eq!(
            tokenize("Used C#, C++ and scikit-learn (node.js)."),
            vec!["Used", "C#", ",", "C++", "and", "scikit-learn", "(", "node.js", ")", "."]
        );
    }

    #[test]
    fn test_tokenize_bullets_and_possessives() {
        assert_eq!(tokenize("• Jane's project"), vec!["•", "Jane", "'s", "project"]);
        assert_eq!(tokenize("-Built"), vec!["-", "Built"]);
    }

    #[test]
    fn test_tokenize_keeps_emails_and_urls() {
        assert_eq!(
            tokenize("jane@acme.io https://github.com/jane"),
            vec!["jane@acme.io", "https://github.com/jane"]
        );
    }

    proptest! {
        #[test]
        fn prop_sentences_partition_text(text in "[A-Za-z .!?\n-]{0,120}") {
            let sentences = split_sentences(&text, &abbreviations());
            let mut cursor = 0;
            for s in &sentences {
                prop_assert_eq!(s.start, cursor);
                prop_assert!(s.end > s.start);
                prop_assert_eq!(&text[s.start..s.end], s.text.as_str());
                cursor = s.end;
            }
            prop_assert_eq!(cursor, text.len());
        }

        #[test]
        fn prop_token_spans_are_ordered_and_non_blank(text in "\\PC{0,80}") {
            let spans = token_spans(&text);
            let mut last_end = 0;
            for (s, e) in spans {
                prop_assert!(s >= last_end);
                prop_assert!(e > s);
                prop_assert!(!text[s..e].trim().is_empty());
                last_end = e;
            }
        }
    }
}
