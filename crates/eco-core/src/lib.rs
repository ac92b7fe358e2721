//! ECO Core - Shared records, errors, and configuration
//!
//! This crate defines the core abstractions used throughout the eco pipeline:
//! - The heading-to-entities mapping exchanged between stages
//! - The reference table of canonical names and categories
//! - Common error types
//! - The uniform name-matching policy
//! - Configuration management

pub mod config;

pub use config::{
    ConfigError, CorpusConfig, ExtractConfig, FilterConfig, MatchingConfig, MissingHeading,
    PipelineConfig, RenderConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for eco operations
#[derive(Error, Debug)]
pub enum EcoError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("Heading not in reference table: {0}")]
    HeadingNotInReference(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EcoError>;

// ============================================================================
// Name Matching Policy
// ============================================================================

/// Build the comparison key for a name under the uniform matching policy.
///
/// Keys are always trimmed; when `case_fold` is set they are additionally
/// lowercased. Every place that compares entity or heading names (the name
/// filter, the reference lookups, the co-occurrence inversion) goes through
/// this one function, so the policy cannot drift between stages.
pub fn match_key(name: &str, case_fold: bool) -> String {
    let name = name.trim();
    if case_fold {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

// ============================================================================
// Entity Mapping
// ============================================================================

/// Mapping from heading term to the entity strings extracted from its segment.
///
/// This is the artifact the extraction stage produces and every later stage
/// consumes. It serializes as a flat JSON object (`{"<heading>": ["<entity>",
/// ...], ...}`). Keys iterate in lexicographic order, which makes every
/// artifact derived from a mapping deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMapping {
    pub entries: BTreeMap<String, Vec<String>>,
}

impl EntityMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of headings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of entity strings across all headings
    pub fn entity_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Insert a heading with its entity list, returning the previous list if
    /// the heading was already present
    pub fn insert(&mut self, heading: impl Into<String>, entities: Vec<String>) -> Option<Vec<String>> {
        self.entries.insert(heading.into(), entities)
    }

    /// Entity list for a heading
    pub fn get(&self, heading: &str) -> Option<&[String]> {
        self.entries.get(heading).map(Vec::as_slice)
    }

    pub fn contains(&self, heading: &str) -> bool {
        self.entries.contains_key(heading)
    }

    /// Iterate headings and entity lists in lexicographic heading order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    /// Headings in lexicographic order
    pub fn headings(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Load a mapping from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EcoError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| EcoError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the mapping to a JSON file (pretty-printed, keys sorted)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;

        std::fs::write(path, content).map_err(|e| EcoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// ============================================================================
// Reference Table
// ============================================================================

/// One record of the reference table
///
/// `display_name` is the canonical form of the name; it is required and a
/// record without it is a schema error. `category` is an optional grouping
/// attached to graph nodes. Extra fields in the source JSON are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Canonical display form of the name
    pub display_name: String,

    /// Optional category carried onto graph nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Authoritative table of canonical names, keyed like the mapping's headings.
///
/// Serialized as a JSON object (`{"<key>": {"display_name": ..., "category":
/// ...}, ...}`). Loading validates every record up front; a malformed record
/// fails the whole load rather than surfacing later as a silent mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    pub entries: BTreeMap<String, ReferenceEntry>,
}

impl ReferenceTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an exact table key
    pub fn get(&self, key: &str) -> Option<&ReferenceEntry> {
        self.entries.get(key)
    }

    /// Index from the match key of each table key to its entry
    pub fn key_index(&self, case_fold: bool) -> BTreeMap<String, &ReferenceEntry> {
        self.entries
            .iter()
            .map(|(key, entry)| (match_key(key, case_fold), entry))
            .collect()
    }

    /// Index from the match key of each display name to its canonical form
    pub fn display_index(&self, case_fold: bool) -> BTreeMap<String, &str> {
        self.entries
            .values()
            .map(|entry| (match_key(&entry.display_name, case_fold), entry.display_name.as_str()))
            .collect()
    }

    /// Load a reference table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EcoError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| EcoError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
