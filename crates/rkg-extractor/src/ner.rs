//! Named Entity Recognition (NER) module
//!
//! Rule-based recognizer over an already tokenized and tagged document:
//! - Regex patterns for dates (ranges, month-year, numeric, bare years)
//! - Proper-noun runs classified with gazetteers and left-context cues
//!
//! Overlapping spans are resolved by keeping the earliest, then longest,
//! match.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{EntitySpan, NerLabel, PosTag, Sentence, Token};
use crate::lexicon::Lexicon;

// ============================================================================
// Date Patterns
// ============================================================================

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";
const YEAR: &str = r"(?:19|20)\d{2}";
const OPEN_END: &str = r"(?:present|current|now|today)";
const DASH: &str = r"\s*(?:-|–|—|to)\s*";

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Jan 2020 - Present, March 2018 – June 2021
        format!(r"(?i)\b{MONTH}\s+{YEAR}{DASH}(?:{MONTH}\s+{YEAR}|{OPEN_END})\b"),
        // 2019 - 2021, 2020 – Present
        format!(r"(?i)\b{YEAR}{DASH}(?:{YEAR}|{OPEN_END})\b"),
        // June 2021
        format!(r"(?i)\b{MONTH}\s+{YEAR}\b"),
        // 2021-06-01, 2021-06
        format!(r"\b{YEAR}-\d{{1,2}}(?:-\d{{1,2}})?\b"),
        // 06/2021, 1/6/2021
        format!(r"\b\d{{1,2}}/(?:\d{{1,2}}/)?(?:{YEAR}|\d{{2}})\b"),
        format!(r"\b{YEAR}\b"),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

// ============================================================================
// Rule-based NER
// ============================================================================

/// Rule-based NER using regex patterns and gazetteers
pub struct RuleBasedNer {
    lexicon: Arc<Lexicon>,
}

impl RuleBasedNer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Recognize entity spans in a tagged document
    pub fn recognize(&self, text: &str, sentences: &[Sentence], tokens: &[Token]) -> Vec<EntitySpan> {
        let dates = self.extract_dates(text);
        let mut entities = dates.clone();
        entities.extend(self.extract_name_runs(text, sentences, tokens, &dates));
        deduplicate(entities)
    }

    /// Extract dates using pattern matching
    fn extract_dates(&self, text: &str) -> Vec<EntitySpan> {
        let mut entities = Vec::new();

        for regex in DATE_PATTERNS.iter() {
            for mat in regex.find_iter(text) {
                entities.push(EntitySpan {
                    text: mat.as_str().to_string(),
                    label: NerLabel::Date,
                    start: mat.start(),
                    end: mat.end(),
                });
            }
        }

        deduplicate(entities)
    }

    /// Extract runs of proper nouns and classify each run
    fn extract_name_runs(
        &self,
        text: &str,
        sentences: &[Sentence],
        tokens: &[Token],
        dates: &[EntitySpan],
    ) -> Vec<EntitySpan> {
        let in_date = |t: &Token| dates.iter().any(|d| t.start < d.end && d.start < t.end);
        let is_name_token = |t: &Token| {
            t.pos == PosTag::ProperNoun
                && !t.text.contains('@')
                && !t.text.contains("://")
                && !self.lexicon.person_titles.contains(&t.text.to_lowercase())
                && !in_date(t)
        };

        let mut entities = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if !is_name_token(&tokens[i]) {
                i += 1;
                continue;
            }

            let sentence_idx = tokens[i].sentence_idx;
            let mut end = i;
            loop {
                let next = end + 1;
                if next < tokens.len()
                    && tokens[next].sentence_idx == sentence_idx
                    && is_name_token(&tokens[next])
                {
                    end = next;
                    continue;
                }
                // "University of Oxford", "Procter & Gamble"
                let joins = next + 1 < tokens.len()
                    && tokens[next].sentence_idx == sentence_idx
                    && tokens[next + 1].sentence_idx == sentence_idx
                    && matches!(tokens[next].text.as_str(), "of" | "&")
                    && is_name_token(&tokens[next + 1]);
                if joins {
                    end = next + 1;
                    continue;
                }
                break;
            }

            let run = &tokens[i..=end];
            if let Some(label) = self.classify_run(run, &tokens[..i], sentences, tokens) {
                entities.push(EntitySpan {
                    text: text[run[0].start..run[run.len() - 1].end].to_string(),
                    label,
                    start: run[0].start,
                    end: run[run.len() - 1].end,
                });
            }
            i = end + 1;
        }

        entities
    }

    /// Label a proper-noun run from its words and left context
    fn classify_run(
        &self,
        run: &[Token],
        before: &[Token],
        sentences: &[Sentence],
        tokens: &[Token],
    ) -> Option<NerLabel> {
        let lex = &self.lexicon;
        let words: Vec<String> = run.iter().map(|t| t.text.to_lowercase()).collect();
        let phrase = words.join(" ");
        let first = words.first()?;
        let last = words.last()?;

        let of_form = words.iter().any(|w| w == "of") && lex.org_suffixes.contains(first);
        if lex.known_orgs.contains(&phrase)
            || of_form
            || (words.len() > 1 && lex.org_suffixes.contains(last))
        {
            return Some(NerLabel::Org);
        }
        if lex.places.contains(&phrase) {
            return Some(NerLabel::Gpe);
        }
        if lex.locations.contains(&phrase) {
            return Some(NerLabel::Loc);
        }

        let sentence_idx = run[0].sentence_idx;
        let context: Vec<String> = before
            .iter()
            .rev()
            .take_while(|t| t.sentence_idx == sentence_idx)
            .filter(|t| t.pos != PosTag::Punct || t.text == "@")
            .take(2)
            .map(|t| t.text.to_lowercase())
            .collect();
        let prev = context.first().map(String::as_str);

        if prev.is_some_and(|p| lex.person_titles.contains(p)) {
            return Some(NerLabel::Person);
        }
        if words.len() <= 3 && lex.given_names.contains(first) {
            return Some(NerLabel::Person);
        }
        if prev.is_some_and(|p| lex.org_cues.contains(p)) {
            return Some(NerLabel::Org);
        }
        let based_in = context.len() == 2 && context[0] == "in" && context[1] == "based";
        if based_in || prev.is_some_and(|p| lex.place_cues.contains(p)) {
            return Some(NerLabel::Gpe);
        }
        if self.is_header_name(run, sentences, tokens) {
            return Some(NerLabel::Person);
        }

        None
    }

    /// A two or three word title-case line opening the document
    fn is_header_name(&self, run: &[Token], sentences: &[Sentence], tokens: &[Token]) -> bool {
        let Some(first_sentence) = sentences.iter().position(|s| !s.text.trim().is_empty()) else {
            return false;
        };
        if run[0].sentence_idx != first_sentence {
            return false;
        }
        let words: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.sentence_idx == first_sentence && t.pos != PosTag::Punct)
            .collect();
        let title_case = |t: &Token| {
            let mut chars = t.text.chars();
            t.is_alpha()
                && chars.next().is_some_and(char::is_uppercase)
                && chars.all(char::is_lowercase)
        };

        (2..=3).contains(&words.len())
            && words.len() == run.len()
            && words.iter().all(|t| title_case(t))
    }
}

/// Remove overlapping spans, keeping the earliest and then the longest
fn deduplicate(mut entities: Vec<EntitySpan>) -> Vec<EntitySpan> {
    entities.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

    let mut result = Vec::new();
    let mut covered: HashSet<usize> = HashSet::new();

    for entity in entities {
        let overlaps = (entity.start..entity.end).any(|i| covered.contains(&i));
        if !overlaps {
            covered.extend(entity.start..entity.end);
            result.push(entity);
        }
    }

    result.sort_by_key(|e| e.start);
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::RuleBasedAnnotator;
    use crate::LinguisticAnnotator;

    fn entities(text: &str) -> Vec<(String, NerLabel)> {
        let annotator = RuleBasedAnnotator::new(Lexicon::builtin().unwrap());
        annotator
            .annotate(text)
            .unwrap()
            .entities
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn has(found: &[(String, NerLabel)], text: &str, label: NerLabel) -> bool {
        found.iter().any(|(t, l)| t == text && *l == label)
    }

    #[test]
    fn test_date_patterns() {
        let found = entities("Engineer, Jan 2020 - Present. Intern 2017 – 2018. Graduated 06/2016.");
        assert!(has(&found, "Jan 2020 - Present", NerLabel::Date), "{found:?}");
        assert!(has(&found, "2017 – 2018", NerLabel::Date), "{found:?}");
        assert!(has(&found, "06/2016", NerLabel::Date), "{found:?}");
    }

    #[test]
    fn test_person_from_given_name_and_org_from_suffix() {
        let found = entities("Jane Doe built a pipeline using Python and Docker at Acme Corp.");
        assert!(has(&found, "Jane Doe", NerLabel::Person), "{found:?}");
        assert!(has(&found, "Acme Corp", NerLabel::Org), "{found:?}");
    }

    #[test]
    fn test_places_from_gazetteer_and_cue() {
        let found = entities("She moved to New York. The team is based in Springfield.");
        assert!(has(&found, "New York", NerLabel::Gpe), "{found:?}");
        assert!(has(&found, "Springfield", NerLabel::Gpe), "{found:?}");
    }

    #[test]
    fn test_org_from_cue_and_of_join() {
        let found = entities("Researcher at Initech. Studied at University of Oxford.");
        assert!(has(&found, "Initech", NerLabel::Org), "{found:?}");
        assert!(has(&found, "University of Oxford", NerLabel::Org), "{found:?}");
    }

    #[test]
    fn test_header_name_and_title() {
        let found = entities("Zorana Quill\nWorked with Dr. Okafor on compilers.");
        assert!(has(&found, "Zorana Quill", NerLabel::Person), "{found:?}");
        assert!(has(&found, "Okafor", NerLabel::Person), "{found:?}");
    }

    #[test]
    fn test_plain_sentence_has_no_entities() {
        assert!(entities("the weather was sunny and warm today.").is_empty());
    }

    #[test]
    fn test_deduplicate_prefers_longer_span() {
        let span = |text: &str, start, end| EntitySpan {
            text: text.to_string(),
            label: NerLabel::Date,
            start,
            end,
        };
        let kept = deduplicate(vec![span("2020", 4, 8), span("Jan 2020", 0, 8), span("2021", 10, 14)]);
        let texts: Vec<&str> = kept.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Jan 2020", "2021"]);
    }
}
