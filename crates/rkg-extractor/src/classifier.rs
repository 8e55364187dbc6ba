//! Entity classification and normalization
//!
//! Builds the eight entity groups from the annotated document, regex scans,
//! the skill vocabulary and the project-line heuristic. Conflict resolution
//! runs last: a value that is a skill is never also a person, organization
//! or place.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use rkg_core::{EntityGroup, EntityMap};

use crate::document::{AnnotatedDocument, NerLabel};
use crate::text::{clean_ws, looks_like_section_heading, strip_bullets_and_noise, truncate_chars};
use crate::vocabulary::SkillVocabulary;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid email regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s)]+").expect("valid url regex"));
static PROJECT_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(project|built|developed|created|implemented|designed|led)\b")
        .expect("valid project cue regex")
});

/// Map an annotator label to its entity group
pub fn group_for_label(label: NerLabel) -> EntityGroup {
    match label {
        NerLabel::Person => EntityGroup::People,
        NerLabel::Org => EntityGroup::Orgs,
        NerLabel::Gpe | NerLabel::Loc => EntityGroup::Places,
        NerLabel::Date => EntityGroup::Dates,
    }
}

/// Assembles and normalizes entity groups
#[derive(Debug, Clone)]
pub struct EntityClassifier {
    project_line_max_chars: usize,
}

impl EntityClassifier {
    pub fn new(project_line_max_chars: usize) -> Self {
        Self {
            project_line_max_chars,
        }
    }

    /// Classify one document into the eight groups
    pub fn classify(
        &self,
        doc: &AnnotatedDocument,
        matched_skills: &BTreeSet<String>,
        vocabulary: &SkillVocabulary,
    ) -> EntityMap {
        let mut map = EntityMap::new();

        for group in [
            EntityGroup::People,
            EntityGroup::Orgs,
            EntityGroup::Places,
            EntityGroup::Dates,
        ] {
            let values = doc
                .entities
                .iter()
                .filter(|e| group_for_label(e.label) == group)
                .map(|e| e.text.clone());
            map.set(group, normalize_values(values));
        }

        let emails = EMAIL_RE.find_iter(&doc.text).map(|m| m.as_str().to_string());
        map.set(EntityGroup::Emails, normalize_values(emails));
        let urls = URL_RE.find_iter(&doc.text).map(|m| m.as_str().to_string());
        map.set(EntityGroup::Urls, normalize_values(urls));

        let skills: BTreeSet<String> = matched_skills
            .iter()
            .chain(vocabulary.terms())
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect();
        map.set(EntityGroup::Skills, skills.into_iter().collect());

        map.set(EntityGroup::Projects, self.project_lines(&doc.text));

        let resolved = resolve_skill_conflicts(map);
        debug!(
            people = resolved.get(EntityGroup::People).len(),
            orgs = resolved.get(EntityGroup::Orgs).len(),
            places = resolved.get(EntityGroup::Places).len(),
            skills = resolved.get(EntityGroup::Skills).len(),
            projects = resolved.get(EntityGroup::Projects).len(),
            "Classified entities"
        );
        resolved
    }

    /// Lines carrying a project verb cue, truncated and whitespace-collapsed
    fn project_lines(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        text.lines()
            .map(strip_bullets_and_noise)
            .filter(|line| PROJECT_CUE_RE.is_match(line))
            .map(|line| clean_ws(truncate_chars(&line, self.project_line_max_chars)))
            .filter(|line| !line.is_empty() && seen.insert(line.to_lowercase()))
            .collect()
    }
}

/// Strip noise, drop empties and headings, dedup case-insensitively
/// keeping the first-seen casing
pub fn normalize_values(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| strip_bullets_and_noise(&v))
        .filter(|v| !v.is_empty() && !looks_like_section_heading(v))
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

/// Remove SKILLS values (case-insensitive) from PEOPLE, ORGS and PLACES
pub fn resolve_skill_conflicts(map: EntityMap) -> EntityMap {
    let skills: HashSet<String> = map
        .get(EntityGroup::Skills)
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let mut resolved = map.clone();
    for group in EntityGroup::NAME_LIKE {
        let kept = map
            .get(group)
            .iter()
            .filter(|v| !skills.contains(&v.to_lowercase()))
            .cloned()
            .collect();
        resolved.set(group, kept);
    }
    resolved
}
