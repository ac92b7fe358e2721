//! ECO Corpus - Heading-marker segmentation
//!
//! The corpus format is a single UTF-8 text file in which every subject is
//! introduced by a marker line: a line starting with the marker word
//! followed by the heading term, e.g. `About Mont Blanc`. The segmenter
//! locates every marker line and slices the text between consecutive
//! markers into per-heading segments.
//!
//! Text before the first marker is ignored. A file with no marker lines
//! yields no segments rather than an error.

use regex::Regex;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while segmenting a corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    /// IO error while reading the corpus file
    #[error("IO error reading corpus: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured heading marker cannot be used
    #[error("Invalid heading marker {marker:?}: {message}")]
    InvalidMarker { marker: String, message: String },
}

pub type Result<T> = std::result::Result<T, CorpusError>;

// ============================================================================
// Segments
// ============================================================================

/// One corpus segment: a heading term and the body text that follows its
/// marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Heading term from the marker line, trimmed
    pub heading: String,

    /// Body text up to the next marker line, trimmed
    pub body: String,
}

// ============================================================================
// Segmenter
// ============================================================================

/// Splits corpus text on heading marker lines
#[derive(Debug)]
pub struct Segmenter {
    marker: Regex,
}

impl Segmenter {
    /// Create a segmenter for the given marker word
    ///
    /// A marker line is a line beginning with `marker_word`, at least one
    /// space or tab, and the heading term as the rest of the line.
    pub fn new(marker_word: &str) -> Result<Self> {
        let word = marker_word.trim();
        if word.is_empty() {
            return Err(CorpusError::InvalidMarker {
                marker: marker_word.to_string(),
                message: "marker word is empty".to_string(),
            });
        }

        let pattern = format!(r"(?m)^{}[ \t]+(.+)$", regex::escape(word));
        let marker = Regex::new(&pattern).map_err(|e| CorpusError::InvalidMarker {
            marker: word.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { marker })
    }

    /// Segment raw corpus text
    ///
    /// Returns one segment per marker line, in document order. Headings are
    /// not deduplicated here; a corpus that repeats a heading produces one
    /// segment per occurrence.
    pub fn segment_text(&self, text: &str) -> Vec<Segment> {
        let mut marks = Vec::new();
        for caps in self.marker.captures_iter(text) {
            // group 0 always exists; group 1 is the heading term
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let heading = match caps.get(1) {
                Some(m) => m.as_str().trim().to_string(),
                None => continue,
            };
            marks.push((whole.start(), whole.end(), heading));
        }

        let mut segments = Vec::with_capacity(marks.len());
        for (i, (_, line_end, heading)) in marks.iter().enumerate() {
            let body_end = match marks.get(i + 1) {
                Some((next_start, _, _)) => *next_start,
                None => text.len(),
            };
            let body = text[*line_end..body_end].trim().to_string();
            segments.push(Segment {
                heading: heading.clone(),
                body,
            });
        }
        segments
    }

    /// Read and segment a corpus file
    pub fn segment_file(&self, path: impl AsRef<std::path::Path>) -> Result<Vec<Segment>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CorpusError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(self.segment_text(&text))
    }
}

// ============================================================================
// Tests
// ============================================================================
