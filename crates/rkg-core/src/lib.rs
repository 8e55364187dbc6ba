//! RKG Core - Domain models, errors, and shared types
//!
//! This crate defines the abstractions shared by every stage of the
//! resume/research knowledge graph pipeline:
//! - Entity groups and the normalized group -> values mapping
//! - Relation types and directed edges between entity values
//! - Edge evidence records
//! - Graph export (nodes/edges) consumed by renderers and JSON export
//! - Common error types
//! - Configuration management

pub mod config;
pub mod graph;

pub use config::{
    AnnotatorConfig, AppConfig, ConfigError, EmbeddingConfig, EmbeddingProvider,
    ExtractionConfig, LoggingConfig, DEFAULT_SKILLS,
};
pub use graph::{GraphExport, GraphNode};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for RKG operations
#[derive(Error, Debug)]
pub enum RkgError {
    /// A linguistic or embedding model could not be loaded. Fatal for the process.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for RkgError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RkgError>;

// ============================================================================
// Entity Groups
// ============================================================================

/// Fixed, closed set of output categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityGroup {
    People,
    Orgs,
    Places,
    Dates,
    Emails,
    Urls,
    Skills,
    Projects,
}

impl EntityGroup {
    /// All groups in presentation order
    pub const ALL: [EntityGroup; 8] = [
        Self::People,
        Self::Orgs,
        Self::Places,
        Self::Dates,
        Self::Emails,
        Self::Urls,
        Self::Skills,
        Self::Projects,
    ];

    /// Groups that lose a value whenever the same value is a skill
    pub const NAME_LIKE: [EntityGroup; 3] = [Self::People, Self::Orgs, Self::Places];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::People => "PEOPLE",
            Self::Orgs => "ORGS",
            Self::Places => "PLACES",
            Self::Dates => "DATES",
            Self::Emails => "EMAILS",
            Self::Urls => "URLS",
            Self::Skills => "SKILLS",
            Self::Projects => "PROJECTS",
        }
    }
}

impl std::fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityGroup {
    type Err = RkgError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PEOPLE" | "PERSON" | "PERSONS" => Ok(Self::People),
            "ORGS" | "ORG" | "ORGANIZATIONS" => Ok(Self::Orgs),
            "PLACES" | "PLACE" | "LOCATIONS" => Ok(Self::Places),
            "DATES" | "DATE" => Ok(Self::Dates),
            "EMAILS" | "EMAIL" => Ok(Self::Emails),
            "URLS" | "URL" => Ok(Self::Urls),
            "SKILLS" | "SKILL" => Ok(Self::Skills),
            "PROJECTS" | "PROJECT" => Ok(Self::Projects),
            other => Err(RkgError::Parse(format!("unknown entity group: {other}"))),
        }
    }
}

// ============================================================================
// Entity Map
// ============================================================================

/// Mapping from every entity group to a sorted list of unique values.
///
/// All eight groups are always present; an absent group is an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<EntityGroup, Vec<String>>",
    into = "BTreeMap<EntityGroup, Vec<String>>"
)]
pub struct EntityMap {
    groups: BTreeMap<EntityGroup, Vec<String>>,
}

impl EntityMap {
    /// Create a map with all eight groups empty
    pub fn new() -> Self {
        Self {
            groups: EntityGroup::ALL.iter().map(|g| (*g, Vec::new())).collect(),
        }
    }

    /// Replace the values of a group. Values are sorted and exact duplicates removed.
    pub fn set(&mut self, group: EntityGroup, mut values: Vec<String>) {
        values.sort();
        values.dedup();
        self.groups.insert(group, values);
    }

    /// Builder form of [`EntityMap::set`]
    pub fn with_group(mut self, group: EntityGroup, values: Vec<String>) -> Self {
        self.set(group, values);
        self
    }

    /// Values of one group
    pub fn get(&self, group: EntityGroup) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate groups in presentation order
    pub fn iter(&self) -> impl Iterator<Item = (EntityGroup, &[String])> {
        self.groups.iter().map(|(g, v)| (*g, v.as_slice()))
    }

    /// Whether `value` belongs to any group (exact match)
    pub fn contains(&self, value: &str) -> bool {
        self.groups.values().any(|vs| vs.iter().any(|v| v == value))
    }

    /// Total number of values across groups
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Keep only the visible groups; hidden groups become empty lists.
    pub fn retain_groups(&self, visible: &[EntityGroup]) -> Self {
        let mut out = Self::new();
        for (group, values) in &self.groups {
            if visible.contains(group) {
                out.groups.insert(*group, values.clone());
            }
        }
        out
    }
}

impl Default for EntityMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<EntityGroup, Vec<String>>> for EntityMap {
    fn from(groups: BTreeMap<EntityGroup, Vec<String>>) -> Self {
        let mut map = Self::new();
        for (group, values) in groups {
            map.set(group, values);
        }
        map
    }
}

impl From<EntityMap> for BTreeMap<EntityGroup, Vec<String>> {
    fn from(map: EntityMap) -> Self {
        map.groups
    }
}

// ============================================================================
// Relations and Edges
// ============================================================================

/// Relation types produced by the co-occurrence rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    WorkedAt, // PEOPLE -> ORGS
    Uses,     // PROJECTS -> SKILLS
    BasedIn,  // PEOPLE -> PLACES
    At,       // PROJECTS -> ORGS
}

impl RelationType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkedAt => "worked_at",
            Self::Uses => "uses",
            Self::BasedIn => "based_in",
            Self::At => "at",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationType {
    type Err = RkgError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "worked_at" => Ok(Self::WorkedAt),
            "uses" => Ok(Self::Uses),
            "based_in" => Ok(Self::BasedIn),
            "at" => Ok(Self::At),
            other => Err(RkgError::Parse(format!("unknown relation: {other}"))),
        }
    }
}

/// A directed labeled relationship between two entity values
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub relation: RelationType,
    pub target: String,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: impl Into<String>, relation: RelationType, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            relation,
            target: target.into(),
        }
    }
}

/// Deduplicated, ordered set of edges
pub type EdgeSet = BTreeSet<Edge>;

/// Sentences supporting a single inferred edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvidence {
    pub source: String,
    pub relation: RelationType,
    pub target: String,
    /// Number of sentences containing both endpoints
    pub count: usize,
    /// Up to two trimmed, truncated example sentences
    pub examples: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
