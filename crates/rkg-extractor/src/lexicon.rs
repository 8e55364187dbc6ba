//! Annotator lexicon
//!
//! Gazetteers and closed-class word lists used by the rule-based annotator.
//! A default lexicon is compiled into the binary; a user TOML file with the
//! same keys extends it.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use rkg_core::{Result, RkgError};

const DEFAULT_LEXICON: &str = include_str!("lexicon/default.toml");

/// Word lists, all lowercase
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub given_names: HashSet<String>,
    pub person_titles: HashSet<String>,
    pub places: HashSet<String>,
    pub locations: HashSet<String>,
    pub known_orgs: HashSet<String>,
    pub org_suffixes: HashSet<String>,
    pub org_cues: HashSet<String>,
    pub place_cues: HashSet<String>,
    pub determiners: HashSet<String>,
    pub prepositions: HashSet<String>,
    pub pronouns: HashSet<String>,
    pub conjunctions: HashSet<String>,
    pub auxiliaries: HashSet<String>,
    pub verbs: HashSet<String>,
    pub abbreviations: HashSet<String>,
}

impl Lexicon {
    /// The built-in lexicon
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_LEXICON, "<builtin>")
    }

    /// Built-in lexicon extended with a user file
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let mut lexicon = Self::builtin()?;
        if let Some(path) = extra {
            let content = std::fs::read_to_string(path).map_err(|e| {
                RkgError::ModelLoad(format!("cannot read lexicon {}: {e}", path.display()))
            })?;
            lexicon.extend(Self::parse(&content, &path.display().to_string())?);
        }
        Ok(lexicon)
    }

    /// Parse a TOML lexicon
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let lexicon: Self = toml::from_str(content)
            .map_err(|e| RkgError::ModelLoad(format!("invalid lexicon {origin}: {e}")))?;
        Ok(lexicon.lowercased())
    }

    /// Merge another lexicon into this one
    pub fn extend(&mut self, other: Self) {
        self.given_names.extend(other.given_names);
        self.person_titles.extend(other.person_titles);
        self.places.extend(other.places);
        self.locations.extend(other.locations);
        self.known_orgs.extend(other.known_orgs);
        self.org_suffixes.extend(other.org_suffixes);
        self.org_cues.extend(other.org_cues);
        self.place_cues.extend(other.place_cues);
        self.determiners.extend(other.determiners);
        self.prepositions.extend(other.prepositions);
        self.pronouns.extend(other.pronouns);
        self.conjunctions.extend(other.conjunctions);
        self.auxiliaries.extend(other.auxiliaries);
        self.verbs.extend(other.verbs);
        self.abbreviations.extend(other.abbreviations);
    }

    fn lowercased(self) -> Self {
        fn lower(set: HashSet<String>) -> HashSet<String> {
            set.into_iter().map(|s| s.trim().to_lowercase()).collect()
        }
        Self {
            given_names: lower(self.given_names),
            person_titles: lower(self.person_titles),
            places: lower(self.places),
            locations: lower(self.locations),
            known_orgs: lower(self.known_orgs),
            org_suffixes: lower(self.org_suffixes),
            org_cues: lower(self.org_cues),
            place_cues: lower(self.place_cues),
            determiners: lower(self.determiners),
            prepositions: lower(self.prepositions),
            pronouns: lower(self.pronouns),
            conjunctions: lower(self.conjunctions),
            auxiliaries: lower(self.auxiliaries),
            verbs: lower(self.verbs),
            abbreviations: lower(self.abbreviations),
        }
    }
}
