//! ECO Extractor - entity recognition over corpus segments
//!
//! Turns segmented corpus text into the heading-to-entities mapping:
//! - `EntityRecognizer` is the seam behind which recognition strategies live
//! - `RuleRecognizer` is the shipped implementation (patterns + gazetteer +
//!   capitalized-span heuristic)
//! - `ExtractionContext` wires a recognizer to the extraction options and
//!   runs it over segments
//!
//! The crate also carries the two mapping-level operations that come after
//! extraction: the canonical-name filter and the coverage check.

pub mod coverage;
pub mod filter;
pub mod rules;

pub use coverage::{check_coverage, parse_expected, CoverageReport};
pub use filter::filter_mapping;
pub use rules::RuleRecognizer;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use eco_core::config::{ConfigError, ExtractConfig};
use eco_core::{EntityMapping, Result};
use eco_corpus::Segment;

// ============================================================================
// Entity Kinds
// ============================================================================

/// Entity kinds recognized by the extraction stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    // Names
    Person,
    Place,
    Org,
    Event,
    Facility,
    Nationality,
    WorkOfArt,
    Language,

    // Closed classes dropped in the default extraction mode
    Date,
    Time,
    Cardinal,
    Ordinal,
    Quantity,
    Percent,
    Money,
    Law,

    // Anything recognized without a clearer kind
    Misc,
}

/// Kinds dropped by the default extraction options
pub const DEFAULT_EXCLUDE: &[EntityKind] = &[
    EntityKind::Cardinal,
    EntityKind::Date,
    EntityKind::Time,
    EntityKind::Quantity,
    EntityKind::Ordinal,
    EntityKind::Law,
];

impl EntityKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Org => "org",
            Self::Event => "event",
            Self::Facility => "facility",
            Self::Nationality => "nationality",
            Self::WorkOfArt => "work_of_art",
            Self::Language => "language",
            Self::Date => "date",
            Self::Time => "time",
            Self::Cardinal => "cardinal",
            Self::Ordinal => "ordinal",
            Self::Quantity => "quantity",
            Self::Percent => "percent",
            Self::Money => "money",
            Self::Law => "law",
            Self::Misc => "misc",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "place" => Ok(Self::Place),
            "org" => Ok(Self::Org),
            "event" => Ok(Self::Event),
            "facility" => Ok(Self::Facility),
            "nationality" => Ok(Self::Nationality),
            "work_of_art" => Ok(Self::WorkOfArt),
            "language" => Ok(Self::Language),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "cardinal" => Ok(Self::Cardinal),
            "ordinal" => Ok(Self::Ordinal),
            "quantity" => Ok(Self::Quantity),
            "percent" => Ok(Self::Percent),
            "money" => Ok(Self::Money),
            "law" => Ok(Self::Law),
            "misc" => Ok(Self::Misc),
            _ => Err(ConfigError::InvalidValue {
                key: "entity_kind".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Entity Spans and the Recognizer Seam
// ============================================================================

/// A single entity occurrence located in a text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Surface text as it appears in the segment
    pub text: String,

    /// Recognized kind
    pub kind: EntityKind,

    /// Byte offset of the span start
    pub start: usize,

    /// Byte offset one past the span end
    pub end: usize,

    /// Rule confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// Trait for entity recognition strategies
///
/// Implementations return spans ordered by start offset, without overlaps.
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entity spans in a text segment
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;

    /// Recognizer name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Extraction Options and Context
// ============================================================================

/// Options controlling which recognized spans are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep every span regardless of kind
    pub keep_all: bool,

    /// Kinds dropped when `keep_all` is off
    pub exclude: BTreeSet<EntityKind>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keep_all: false,
            exclude: DEFAULT_EXCLUDE.iter().copied().collect(),
        }
    }
}

impl ExtractOptions {
    /// Build options from the configuration section
    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        let mut exclude = BTreeSet::new();
        for name in &config.exclude {
            exclude.insert(name.parse::<EntityKind>()?);
        }
        Ok(Self {
            keep_all: config.keep_all,
            exclude,
        })
    }
}

/// Owns a recognizer and the options, and runs extraction over segments
///
/// The recognizer is injected rather than constructed here, so a different
/// strategy (or a test double) can be swapped in without touching the
/// extraction loop.
pub struct ExtractionContext {
    recognizer: Box<dyn EntityRecognizer>,
    options: ExtractOptions,
}

impl ExtractionContext {
    /// Create a context from a recognizer and options
    pub fn new(recognizer: Box<dyn EntityRecognizer>, options: ExtractOptions) -> Self {
        Self {
            recognizer,
            options,
        }
    }

    /// Name of the wired recognizer
    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    fn keeps(&self, kind: EntityKind) -> bool {
        self.options.keep_all || !self.options.exclude.contains(&kind)
    }

    /// Recognize and filter spans for one text segment
    pub fn extract_segment(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let spans = self.recognizer.recognize(text)?;
        Ok(spans.into_iter().filter(|s| self.keeps(s.kind)).collect())
    }

    /// Run extraction over every segment, producing the mapping and a
    /// summary of what was kept and dropped
    ///
    /// Entity strings keep the recognizer's order and duplicates within a
    /// segment are retained. A repeated heading keeps the last occurrence.
    pub fn extract_corpus(&self, segments: &[Segment]) -> Result<(EntityMapping, ExtractionSummary)> {
        let mut mapping = EntityMapping::new();
        let mut summary = ExtractionSummary::default();

        for segment in segments {
            let spans = self.recognizer.recognize(&segment.body)?;
            summary.segments += 1;

            let mut entities = Vec::new();
            for span in spans {
                if self.keeps(span.kind) {
                    summary.kept += 1;
                    *summary.by_kind.entry(span.kind).or_insert(0) += 1;
                    entities.push(span.text);
                } else {
                    summary.dropped += 1;
                }
            }

            if mapping.insert(segment.heading.clone(), entities).is_some() {
                warn!(
                    "duplicate heading {:?} in corpus, keeping the last occurrence",
                    segment.heading
                );
            }
        }

        Ok((mapping, summary))
    }
}

// ============================================================================
// Extraction Summary
// ============================================================================

/// Counts collected during an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Segments processed
    pub segments: usize,

    /// Spans kept in the mapping
    pub kept: usize,

    /// Spans dropped by the exclusion list
    pub dropped: usize,

    /// Kept spans per kind
    pub by_kind: BTreeMap<EntityKind, usize>,
}

impl ExtractionSummary {
    /// Print a summary report
    pub fn report(&self) -> String {
        let mut kinds = String::new();
        for (kind, count) in &self.by_kind {
            kinds.push_str(&format!("  {}: {}\n", kind, count));
        }

        format!(
            "=== Extraction Summary ===\n\n\
             Segments processed: {}\n\
             Entities kept:      {}\n\
             Entities dropped:   {}\n\n\
             Kept by kind:\n{}",
            self.segments, self.kept, self.dropped, kinds
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Recognizer double returning a fixed span list
    struct FixedRecognizer {
        spans: Vec<EntitySpan>,
    }

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
            Ok(self.spans.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn span(text: &str, kind: EntityKind) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            kind,
            start: 0,
            end: text.len(),
            confidence: 1.0,
        }
    }

    fn segments(headings: &[&str]) -> Vec<Segment> {
        headings
            .iter()
            .map(|h| Segment {
                heading: h.to_string(),
                body: format!("body of {}", h),
            })
            .collect()
    }

    #[test]
    fn test_entity_kind_round_trip() {
        assert_eq!(EntityKind::WorkOfArt.as_str(), "work_of_art");
        assert_eq!("work_of_art".parse::<EntityKind>().unwrap(), EntityKind::WorkOfArt);
        assert_eq!("PLACE".parse::<EntityKind>().unwrap(), EntityKind::Place);
        assert!("galaxy".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = ExtractConfig::default();
        let options = ExtractOptions::from_config(&config).unwrap();

        assert!(!options.keep_all);
        assert_eq!(options.exclude.len(), DEFAULT_EXCLUDE.len());
        assert!(options.exclude.contains(&EntityKind::Cardinal));
        assert!(!options.exclude.contains(&EntityKind::Place));
    }

    #[test]
    fn test_options_from_config_rejects_unknown_kind() {
        let config = ExtractConfig {
            exclude: vec!["nebula".to_string()],
            ..ExtractConfig::default()
        };
        assert!(ExtractOptions::from_config(&config).is_err());
    }

    #[test]
    fn test_default_mode_drops_excluded_kinds() {
        let recognizer = FixedRecognizer {
            spans: vec![
                span("Mont Blanc", EntityKind::Place),
                span("1786", EntityKind::Date),
                span("4,810", EntityKind::Cardinal),
                span("Jacques Balmat", EntityKind::Person),
            ],
        };
        let ctx = ExtractionContext::new(Box::new(recognizer), ExtractOptions::default());

        let (mapping, summary) = ctx.extract_corpus(&segments(&["Mont Blanc"])).unwrap();

        assert_eq!(
            mapping.get("Mont Blanc"),
            Some(&["Mont Blanc".to_string(), "Jacques Balmat".to_string()][..])
        );
        assert_eq!(summary.segments, 1);
        assert_eq!(summary.kept, 2);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.by_kind.get(&EntityKind::Place), Some(&1));
    }

    #[test]
    fn test_keep_all_mode_keeps_everything() {
        let recognizer = FixedRecognizer {
            spans: vec![span("1786", EntityKind::Date), span("15", EntityKind::Cardinal)],
        };
        let options = ExtractOptions {
            keep_all: true,
            ..ExtractOptions::default()
        };
        let ctx = ExtractionContext::new(Box::new(recognizer), options);

        let (mapping, summary) = ctx.extract_corpus(&segments(&["Eiger"])).unwrap();

        assert_eq!(mapping.get("Eiger").map(|e| e.len()), Some(2));
        assert_eq!(summary.dropped, 0);
    }

    #[test]
    fn test_one_mapping_key_per_segment() {
        let recognizer = FixedRecognizer { spans: vec![] };
        let ctx = ExtractionContext::new(Box::new(recognizer), ExtractOptions::default());

        let (mapping, summary) = ctx
            .extract_corpus(&segments(&["Eiger", "Jungfrau", "Monch"]))
            .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(summary.segments, 3);
        // a heading with no recognized entities still appears
        assert_eq!(mapping.get("Jungfrau"), Some(&[][..]));
    }

    #[test]
    fn test_duplicate_heading_keeps_last() {
        let recognizer = FixedRecognizer {
            spans: vec![span("Alps", EntityKind::Place)],
        };
        let ctx = ExtractionContext::new(Box::new(recognizer), ExtractOptions::default());

        let mut segs = segments(&["Eiger"]);
        segs.push(Segment {
            heading: "Eiger".to_string(),
            body: String::new(),
        });

        let (mapping, _) = ctx.extract_corpus(&segs).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_summary_report_format() {
        let mut summary = ExtractionSummary {
            segments: 4,
            kept: 10,
            dropped: 3,
            by_kind: BTreeMap::new(),
        };
        summary.by_kind.insert(EntityKind::Place, 7);
        summary.by_kind.insert(EntityKind::Person, 3);

        let report = summary.report();
        assert!(report.contains("Segments processed: 4"));
        assert!(report.contains("Entities dropped:   3"));
        assert!(report.contains("  place: 7"));
    }
}
