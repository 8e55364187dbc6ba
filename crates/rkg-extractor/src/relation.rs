//! Relation inference module
//!
//! Infers directed edges between entity values from sentence co-occurrence.
//! The rule table fixes which group pairs can be related; the
//! [`CooccurrencePredicate`] decides what "appear in the same sentence"
//! means and can be swapped without touching the rules.

use std::sync::Arc;

use tracing::debug;

use rkg_core::{Edge, EdgeEvidence, EdgeSet, EntityGroup, EntityMap, RelationType};

use crate::text::truncate_chars;
use crate::CooccurrencePredicate;

// ============================================================================
// Relation Rules
// ============================================================================

/// One co-occurrence rule: every (source, target) value pair of two groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRule {
    pub source: EntityGroup,
    pub target: EntityGroup,
    pub relation: RelationType,
}

impl RelationRule {
    const fn new(source: EntityGroup, target: EntityGroup, relation: RelationType) -> Self {
        Self {
            source,
            target,
            relation,
        }
    }
}

/// The fixed rule table
pub const RELATION_RULES: [RelationRule; 4] = [
    RelationRule::new(EntityGroup::People, EntityGroup::Orgs, RelationType::WorkedAt),
    RelationRule::new(EntityGroup::Projects, EntityGroup::Skills, RelationType::Uses),
    RelationRule::new(EntityGroup::People, EntityGroup::Places, RelationType::BasedIn),
    RelationRule::new(EntityGroup::Projects, EntityGroup::Orgs, RelationType::At),
];

// ============================================================================
// Co-occurrence Predicates
// ============================================================================

/// Case-insensitive substring containment.
///
/// Short values can match inside longer words ("ai" in "maintain").
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringCooccurrence;

impl CooccurrencePredicate for SubstringCooccurrence {
    fn both_in(&self, sentence: &str, a: &str, b: &str) -> bool {
        sentence.contains(a) && sentence.contains(b)
    }

    fn name(&self) -> &str {
        "substring"
    }
}

/// Containment where each value must start and end on a word boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBoundaryCooccurrence;

impl TokenBoundaryCooccurrence {
    fn contains_word(haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        haystack.match_indices(needle).any(|(start, _)| {
            let end = start + needle.len();
            let before = haystack[..start].chars().next_back();
            let after = haystack[end..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}

impl CooccurrencePredicate for TokenBoundaryCooccurrence {
    fn both_in(&self, sentence: &str, a: &str, b: &str) -> bool {
        Self::contains_word(sentence, a) && Self::contains_word(sentence, b)
    }

    fn name(&self) -> &str {
        "token_boundary"
    }
}

// ============================================================================
// Inference and Evidence
// ============================================================================

/// Applies the rule table over sentences
pub struct RelationInferencer {
    cooccurrence: Arc<dyn CooccurrencePredicate>,
}

impl RelationInferencer {
    pub fn new(cooccurrence: Arc<dyn CooccurrencePredicate>) -> Self {
        Self { cooccurrence }
    }

    /// Edges for every rule pair that co-occurs in at least one sentence
    pub fn infer<S: AsRef<str>>(&self, sentences: &[S], entities: &EntityMap) -> EdgeSet {
        let lowered = lowercase_all(sentences);
        let mut edges = EdgeSet::new();

        for rule in &RELATION_RULES {
            for source in entities.get(rule.source) {
                for target in entities.get(rule.target) {
                    if source.is_empty() || target.is_empty() {
                        continue;
                    }
                    let (a, b) = (source.to_lowercase(), target.to_lowercase());
                    if lowered.iter().any(|s| self.cooccurrence.both_in(s, &a, &b)) {
                        edges.insert(Edge::new(source.as_str(), rule.relation, target.as_str()));
                    }
                }
            }
        }

        debug!(
            edges = edges.len(),
            predicate = self.cooccurrence.name(),
            "Inferred relationships"
        );
        edges
    }

    /// Supporting sentence count and excerpts for each edge
    pub fn collect_evidence<S: AsRef<str>>(
        &self,
        sentences: &[S],
        edges: &EdgeSet,
        max_examples: usize,
        excerpt_chars: usize,
    ) -> Vec<EdgeEvidence> {
        let lowered = lowercase_all(sentences);

        edges
            .iter()
            .map(|edge| {
                let (a, b) = (edge.source.to_lowercase(), edge.target.to_lowercase());
                let supporting: Vec<usize> = lowered
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| self.cooccurrence.both_in(s, &a, &b))
                    .map(|(i, _)| i)
                    .collect();
                let examples = supporting
                    .iter()
                    .take(max_examples)
                    .map(|&i| excerpt(sentences[i].as_ref(), excerpt_chars))
                    .collect();

                EdgeEvidence {
                    source: edge.source.clone(),
                    relation: edge.relation,
                    target: edge.target.clone(),
                    count: supporting.len(),
                    examples,
                }
            })
            .collect()
    }
}

fn lowercase_all<S: AsRef<str>>(sentences: &[S]) -> Vec<String> {
    sentences.iter().map(|s| s.as_ref().to_lowercase()).collect()
}

fn excerpt(sentence: &str, max_chars: usize) -> String {
    truncate_chars(sentence.trim(), max_chars).trim_end().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn substring() -> RelationInferencer {
        RelationInferencer::new(Arc::new(SubstringCooccurrence))
    }

    fn entities() -> EntityMap {
        EntityMap::new()
            .with_group(EntityGroup::People, vec!["Jane Doe".into()])
            .with_group(EntityGroup::Orgs, vec!["Acme Corp".into(), "Initech".into()])
            .with_group(EntityGroup::Places, vec!["Berlin".into()])
            .with_group(EntityGroup::Skills, vec!["python".into(), "ai".into()])
            .with_group(
                EntityGroup::Projects,
                vec!["Built a pipeline using Python at Acme Corp.".into()],
            )
    }

    #[test]
    fn test_rule_table() {
        let relations: Vec<RelationType> = RELATION_RULES.iter().map(|r| r.relation).collect();
        assert_eq!(
            relations,
            vec![
                RelationType::WorkedAt,
                RelationType::Uses,
                RelationType::BasedIn,
                RelationType::At
            ]
        );
    }

    #[test]
    fn test_infers_cooccurring_pairs_only() {
        let sentences = [
            "Jane Doe worked at Acme Corp. ",
            "Built a pipeline using Python at Acme Corp.",
            "Initech is elsewhere.",
        ];
        let edges = substring().infer(&sentences, &entities());

        assert!(edges.contains(&Edge::new("Jane Doe", RelationType::WorkedAt, "Acme Corp")));
        assert!(!edges.contains(&Edge::new("Jane Doe", RelationType::WorkedAt, "Initech")));
        assert!(!edges.contains(&Edge::new("Jane Doe", RelationType::BasedIn, "Berlin")));
        let project = "Built a pipeline using Python at Acme Corp.";
        assert!(edges.contains(&Edge::new(project, RelationType::Uses, "python")));
        assert!(edges.contains(&Edge::new(project, RelationType::At, "Acme Corp")));
    }

    #[test]
    fn test_substring_false_positive_is_kept() {
        let map = EntityMap::new()
            .with_group(EntityGroup::Projects, vec!["Maintained the build".into()])
            .with_group(EntityGroup::Skills, vec!["ai".into()]);
        let edges = substring().infer(&["Maintained the build"], &map);
        assert_eq!(edges.len(), 1);

        let strict = RelationInferencer::new(Arc::new(TokenBoundaryCooccurrence));
        assert!(strict.infer(&["Maintained the build"], &map).is_empty());
    }

    #[test]
    fn test_token_boundary_matches_whole_words() {
        assert!(TokenBoundaryCooccurrence::contains_word("used ai daily", "ai"));
        assert!(TokenBoundaryCooccurrence::contains_word("c++ and rust", "c++"));
        assert!(!TokenBoundaryCooccurrence::contains_word("maintain", "ai"));
        assert!(!TokenBoundaryCooccurrence::contains_word("anything", ""));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(substring().infer::<&str>(&[], &entities()).is_empty());
        assert!(substring().infer(&["Jane Doe at Acme Corp"], &EntityMap::new()).is_empty());
    }

    #[test]
    fn test_evidence_counts_and_examples() {
        let long = format!("  Jane Doe joined Acme Corp {}  ", "x".repeat(300));
        let sentences = vec![
            "Jane Doe worked at Acme Corp.".to_string(),
            long,
            "jane doe left ACME CORP.".to_string(),
        ];
        let mut edges = EdgeSet::new();
        edges.insert(Edge::new("Jane Doe", RelationType::WorkedAt, "Acme Corp"));

        let evidence = substring().collect_evidence(&sentences, &edges, 2, 220);
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].count, 3);
        assert_eq!(evidence[0].examples.len(), 2);
        assert_eq!(evidence[0].examples[0], "Jane Doe worked at Acme Corp.");
        assert!(evidence[0].examples[1].starts_with("Jane Doe joined"));
        assert_eq!(evidence[0].examples[1].chars().count(), 220);
    }

    #[test]
    fn test_evidence_for_empty_edge_set() {
        let evidence = substring().collect_evidence(&["Jane Doe"], &EdgeSet::new(), 2, 220);
        assert!(evidence.is_empty());
    }
}
