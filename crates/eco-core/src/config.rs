//! ECO Configuration Management
//!
//! Pipeline settings loaded from an optional TOML file with sensible
//! defaults. Every section may be omitted; command-line flags override
//! individual values at the CLI layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name-matching policy
    pub matching: MatchingConfig,

    /// Corpus segmentation
    pub corpus: CorpusConfig,

    /// Entity extraction
    pub extract: ExtractConfig,

    /// Name filtering
    pub filter: FilterConfig,

    /// HTML rendering
    pub render: RenderConfig,
}

impl PipelineConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }
}

/// Name-matching policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Compare names case-insensitively (surface forms are preserved in
    /// outputs either way)
    pub case_fold: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { case_fold: true }
    }
}

/// Corpus segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Word that opens a heading line ("About" in "About Mont Blanc")
    pub marker: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            marker: "About".to_string(),
        }
    }
}

/// Entity extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Keep every recognized entity instead of applying the exclusion list
    pub keep_all: bool,

    /// Entity kinds dropped in the default mode
    pub exclude: Vec<String>,

    /// Seed the recognizer gazetteer with the reference table's display names
    pub seed_from_reference: bool,

    /// Entity kind assigned to seeded gazetteer terms
    pub seed_kind: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keep_all: false,
            exclude: vec![
                "cardinal".to_string(),
                "date".to_string(),
                "time".to_string(),
                "quantity".to_string(),
                "ordinal".to_string(),
                "law".to_string(),
            ],
            seed_from_reference: true,
            seed_kind: "place".to_string(),
        }
    }
}

/// Name filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// What to do when a mapping heading is absent from the reference table
    pub on_missing: MissingHeading,
}

/// Policy for mapping headings absent from the reference table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHeading {
    /// Abort the filter run (a gap in the reference table is a data defect)
    #[default]
    Fail,
    /// Drop the heading from the output and log a warning
    Skip,
}

impl MissingHeading {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

impl std::fmt::Display for MissingHeading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTML rendering configuration
///
/// Defaults reproduce the project's established look: dark canvas, dot
/// nodes, white labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas height (CSS length)
    pub height: String,

    /// Canvas width (CSS length)
    pub width: String,

    /// Canvas background color
    pub background: String,

    /// Label font color
    pub font_color: String,

    /// Label font size in points
    pub font_size: u32,

    /// Node fill color
    pub node_color: String,

    /// Node border color
    pub node_border: String,

    /// Node dot size
    pub node_size: u32,

    /// Edge stroke color
    pub edge_color: String,

    /// Base edge width
    pub edge_width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: "800px".to_string(),
            width: "100%".to_string(),
            background: "#222222".to_string(),
            font_color: "white".to_string(),
            font_size: 14,
            node_color: "skyblue".to_string(),
            node_border: "white".to_string(),
            node_size: 10,
            edge_color: "#888".to_string(),
            edge_width: 1,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
