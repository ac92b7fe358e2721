//! Rule-based entity recognizer
//!
//! Three layers, merged by overlap deduplication:
//! - regex patterns for the closed classes (dates, times, numbers, money,
//!   quantities, statute references)
//! - a gazetteer of known names, optionally seeded from the reference table
//! - a capitalized-span heuristic for proper nouns the gazetteer misses,
//!   with cue words steering the kind

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::{EntityKind, EntityRecognizer, EntitySpan};
use eco_core::ReferenceTable;
use eco_core::Result;

/// Proper-noun span: capitalized words, optionally joined by lowercase
/// connectives ("Val d'Isere" style names keep their apostrophes)
const CAPITALIZED_SPAN: &str = r"\p{Lu}[\p{L}'’-]*(?:[ \t](?:of|the|de|la|le|du|des|von|van|der|di|da|del|della)[ \t]\p{Lu}[\p{L}'’-]*|[ \t]\p{Lu}[\p{L}'’-]*)*";

/// Single capitalized words that are sentence furniture, not names
const STOPWORDS: &[&str] = &[
    "The", "A", "An", "It", "Its", "In", "On", "At", "As", "By", "He", "She", "They", "We", "I",
    "You", "This", "That", "These", "Those", "His", "Her", "Their", "Our", "But", "And", "Or",
    "However", "About", "After", "Before", "When", "While", "Where", "With", "From", "For", "To",
    "Not", "No", "If", "So", "Then", "There", "Here", "During", "Although", "Because", "Since",
];

/// Generic words that mark a span as a place name
const PLACE_CUES: &[&str] = &[
    "Mount", "Mont", "Monte", "Pico", "Peak", "Ben", "Cerro", "Massif", "Range", "Ridge",
    "Glacier", "Valley", "Pass", "Col", "Lake", "River", "Bay", "Island", "Islands", "Plateau",
    "Hill", "Hills", "Alps", "Andes", "Pyrenees", "Carpathians", "Himalaya", "Himalayas",
    "Caucasus",
];

/// Generic words that mark a span as an organization name
const ORG_CUES: &[&str] = &[
    "Club", "Society", "Association", "Institute", "University", "College", "Company",
    "Corporation", "Museum", "Observatory", "Commission", "Ministry", "Council", "Survey",
];

/// Honorifics and titles that mark a span as a person name
const PERSON_CUES: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Sir", "Lady", "Lord", "Saint", "St", "Captain", "Colonel",
    "Professor", "King", "Queen", "Prince", "Princess",
];

/// Rule-based recognizer using regex patterns, a gazetteer, and a
/// capitalized-span heuristic
pub struct RuleRecognizer {
    /// Pattern rules (regex -> kind)
    patterns: Vec<(Regex, EntityKind, f32)>,
    /// Known terms, keyed by ASCII-lowercased surface
    gazetteer: HashMap<String, EntityKind>,
    /// Proper-noun heuristic, disabled by `without_heuristic`
    capitalized: Option<Regex>,
}

impl RuleRecognizer {
    /// Create a recognizer with the default pattern set and the heuristic
    /// enabled
    pub fn new() -> Self {
        let mut rec = Self {
            patterns: Vec::new(),
            gazetteer: HashMap::new(),
            capitalized: Regex::new(CAPITALIZED_SPAN).ok(),
        };

        rec.init_patterns();
        rec
    }

    /// Disable the capitalized-span heuristic, leaving patterns and the
    /// gazetteer only
    pub fn without_heuristic(mut self) -> Self {
        self.capitalized = None;
        self
    }

    /// Initialize the closed-class patterns
    fn init_patterns(&mut self) {
        const MONTH: &str = "(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

        // Dates
        self.add_pattern(
            &format!(r"\b\d{{1,2}}\s+{}\s+\d{{4}}\b", MONTH),
            EntityKind::Date,
            0.95,
        );
        self.add_pattern(
            &format!(r"\b{}\s+\d{{1,2}},?\s+\d{{4}}\b", MONTH),
            EntityKind::Date,
            0.95,
        );
        self.add_pattern(&format!(r"\b{}\s+\d{{4}}\b", MONTH), EntityKind::Date, 0.85);
        self.add_pattern(r"\b\d{4}[-/]\d{1,2}[-/]\d{1,2}\b", EntityKind::Date, 0.95);
        self.add_pattern(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{4}\b", EntityKind::Date, 0.95);
        self.add_pattern(r"\b\d{1,2}(?:st|nd|rd|th)\s+century\b", EntityKind::Date, 0.92);
        self.add_pattern(r"\b(?:1[0-9]|20)\d{2}s?\b", EntityKind::Date, 0.7);

        // Times
        self.add_pattern(
            r"\b\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]\.?m\.?)?\b",
            EntityKind::Time,
            0.9,
        );
        self.add_pattern(r"\b\d{1,2}\s*[ap]\.?m\.?\b", EntityKind::Time, 0.85);

        // Percentages
        self.add_pattern(r"\b\d+(?:\.\d+)?\s*%", EntityKind::Percent, 0.9);
        self.add_pattern(r"\b\d+(?:\.\d+)?\s+percent\b", EntityKind::Percent, 0.9);

        // Money
        self.add_pattern(
            r"[$€£¥]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s*(?:million|billion))?",
            EntityKind::Money,
            0.9,
        );
        self.add_pattern(
            r"\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:dollars?|euros?|pounds?|francs?|rupees?|yen)\b",
            EntityKind::Money,
            0.9,
        );

        // Quantities with units
        self.add_pattern(
            r"\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:m|km|mi|ft|kg|lb|metres?|meters?|kilometres?|kilometers?|miles?|feet|foot|yards?|tonnes?|tons?|litres?|liters?|hectares?|acres?)\b",
            EntityKind::Quantity,
            0.88,
        );

        // Ordinals
        self.add_pattern(r"\b\d+(?:st|nd|rd|th)\b", EntityKind::Ordinal, 0.8);
        self.add_pattern(
            r"\b(?:first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth)\b",
            EntityKind::Ordinal,
            0.6,
        );

        // Statute and treaty references
        self.add_pattern(
            r"\b(?:Article|Section|Act|Law|Statute|Decree|Treaty)\s+(?:No\.?\s*)?\d+\b",
            EntityKind::Law,
            0.85,
        );
        self.add_pattern(
            r"\b\p{Lu}[\p{L}]+\s+(?:Act|Treaty|Convention|Protocol)(?:\s+of\s+\d{4})?\b",
            EntityKind::Law,
            0.88,
        );

        // Bare numbers, lowest confidence so the kinds above win overlaps
        self.add_pattern(r"\b\d+(?:,\d{3})*(?:\.\d+)?\b", EntityKind::Cardinal, 0.6);
        self.add_pattern(
            r"\b(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|twenty|thirty|forty|fifty|hundred|thousand|million|billion)\b",
            EntityKind::Cardinal,
            0.55,
        );
    }

    /// Add a regex pattern
    fn add_pattern(&mut self, pattern: &str, kind: EntityKind, confidence: f32) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, kind, confidence));
        }
    }

    /// Add a gazetteer term
    pub fn add_term(&mut self, term: &str, kind: EntityKind) {
        let key = term.trim().to_ascii_lowercase();
        if !key.is_empty() {
            self.gazetteer.insert(key, kind);
        }
    }

    /// Seed the gazetteer with every display name of a reference table
    pub fn seed_from_reference(&mut self, table: &ReferenceTable, kind: EntityKind) {
        for entry in table.entries.values() {
            self.add_term(&entry.display_name, kind);
        }
    }

    /// Number of gazetteer terms
    pub fn term_count(&self) -> usize {
        self.gazetteer.len()
    }

    /// Extract spans matching the closed-class patterns
    fn match_patterns(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        for (regex, kind, confidence) in &self.patterns {
            for mat in regex.find_iter(text) {
                spans.push(EntitySpan {
                    text: mat.as_str().to_string(),
                    kind: *kind,
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        spans
    }

    /// Extract spans matching gazetteer terms
    ///
    /// Matching folds ASCII case only, which keeps byte offsets of the
    /// folded text identical to the original.
    fn match_gazetteer(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let folded = text.to_ascii_lowercase();

        for (term, kind) in &self.gazetteer {
            for (start, _) in folded.match_indices(term.as_str()) {
                let end = start + term.len();
                if at_word_boundary(text, start, end) {
                    spans.push(EntitySpan {
                        text: text[start..end].to_string(),
                        kind: *kind,
                        start,
                        end,
                        confidence: 0.95,
                    });
                }
            }
        }

        spans
    }

    /// Extract capitalized spans not covered by the gazetteer
    fn match_capitalized(&self, text: &str) -> Vec<EntitySpan> {
        let regex = match &self.capitalized {
            Some(regex) => regex,
            None => return Vec::new(),
        };

        let mut spans = Vec::new();
        for mat in regex.find_iter(text) {
            let (start, span_text) = strip_leading_article(mat.start(), mat.as_str());
            if span_text.is_empty() {
                continue;
            }

            let words: Vec<&str> = span_text.split_whitespace().collect();
            if words.len() == 1 {
                let word = words[0];
                if STOPWORDS.contains(&word) || is_cue_word(word) {
                    continue;
                }
                // a lone capitalized word at a sentence start is usually
                // sentence case, not a name
                if at_sentence_start(text, start) {
                    continue;
                }
            }

            spans.push(EntitySpan {
                text: span_text.to_string(),
                kind: steer_kind(&words),
                start,
                end: start + span_text.len(),
                confidence: 0.5,
            });
        }

        spans
    }

    /// Remove overlapping spans, keeping highest confidence
    fn deduplicate(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        // Sort by start, confidence descending, then longest span first so
        // ties do not depend on gazetteer iteration order
        spans.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(
                    b.confidence
                        .partial_cmp(&a.confidence)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(b.end.cmp(&a.end))
        });

        let mut result = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for span in spans {
            let overlaps = (span.start..span.end).any(|i| covered.contains(&i));
            if !overlaps {
                for i in span.start..span.end {
                    covered.insert(i);
                }
                result.push(span);
            }
        }

        result.sort_by_key(|s| s.start);
        result
    }
}

impl Default for RuleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for RuleRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut spans = self.match_patterns(text);
        spans.extend(self.match_gazetteer(text));
        spans.extend(self.match_capitalized(text));

        Ok(Self::deduplicate(spans))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

/// True when neither neighbor of `[start, end)` is alphanumeric
fn at_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

/// Drop a leading "The "/"A "/"An " from a heuristic span
fn strip_leading_article(start: usize, text: &str) -> (usize, &str) {
    for article in ["The ", "A ", "An "] {
        if let Some(rest) = text.strip_prefix(article) {
            let rest = rest.trim_start();
            let offset = text.len() - rest.len();
            return (start + offset, rest);
        }
    }
    (start, text)
}

/// True when the span begins the text or follows end-of-sentence punctuation
fn at_sentence_start(text: &str, start: usize) -> bool {
    for c in text[..start].chars().rev() {
        if c.is_whitespace() && c != '\n' {
            continue;
        }
        return matches!(c, '.' | '!' | '?' | '\n');
    }
    true
}

fn is_cue_word(word: &str) -> bool {
    PLACE_CUES.contains(&word) || ORG_CUES.contains(&word) || PERSON_CUES.contains(&word)
}

/// Pick an entity kind for a heuristic span from its cue words
fn steer_kind(words: &[&str]) -> EntityKind {
    if words.first().is_some_and(|w| PERSON_CUES.contains(w)) {
        return EntityKind::Person;
    }
    if words.iter().any(|w| ORG_CUES.contains(w)) {
        return EntityKind::Org;
    }
    if words.iter().any(|w| PLACE_CUES.contains(w)) {
        return EntityKind::Place;
    }
    EntityKind::Misc
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use eco_core::ReferenceEntry;

    fn kinds_of(spans: &[EntitySpan]) -> Vec<EntityKind> {
        spans.iter().map(|s| s.kind).collect()
    }

    fn texts_of(spans: &[EntitySpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_date_patterns() {
        let rec = RuleRecognizer::new().without_heuristic();

        let spans = rec.recognize("First climbed on 8 August 1786.").unwrap();
        assert!(texts_of(&spans).contains(&"8 August 1786"));
        assert!(kinds_of(&spans).contains(&EntityKind::Date));

        let spans = rec.recognize("Surveyed again in the 19th century.").unwrap();
        assert!(texts_of(&spans).contains(&"19th century"));
    }

    #[test]
    fn test_quantity_beats_cardinal_on_overlap() {
        let rec = RuleRecognizer::new().without_heuristic();
        let spans = rec.recognize("The summit is 4,810 m above sea level.").unwrap();

        assert!(texts_of(&spans).contains(&"4,810 m"));
        // the bare number must not appear as a second span
        assert!(!texts_of(&spans).contains(&"4,810"));
        assert_eq!(
            spans.iter().find(|s| s.text == "4,810 m").map(|s| s.kind),
            Some(EntityKind::Quantity)
        );
    }

    #[test]
    fn test_bare_year_is_a_date() {
        let rec = RuleRecognizer::new().without_heuristic();
        let spans = rec.recognize("The refuge opened in 1853 and burned in 1921.").unwrap();

        let dates: Vec<&EntitySpan> = spans.iter().filter(|s| s.kind == EntityKind::Date).collect();
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_gazetteer_match_respects_word_boundaries() {
        let mut rec = RuleRecognizer::new().without_heuristic();
        rec.add_term("Alps", EntityKind::Place);

        let spans = rec.recognize("He scalps tickets near the alps.").unwrap();
        assert_eq!(texts_of(&spans), vec!["alps"]);
        assert_eq!(spans[0].kind, EntityKind::Place);
    }

    #[test]
    fn test_gazetteer_multi_word_term() {
        let mut rec = RuleRecognizer::new().without_heuristic();
        rec.add_term("Mont Blanc", EntityKind::Place);

        let spans = rec.recognize("The tunnel passes under Mont Blanc itself.").unwrap();
        assert_eq!(texts_of(&spans), vec!["Mont Blanc"]);
        assert!((spans[0].confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_seed_from_reference() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "ben_nevis".to_string(),
            ReferenceEntry {
                display_name: "Ben Nevis".to_string(),
                category: Some("Scotland".to_string()),
            },
        );
        let table = ReferenceTable { entries };

        let mut rec = RuleRecognizer::new().without_heuristic();
        rec.seed_from_reference(&table, EntityKind::Place);
        assert_eq!(rec.term_count(), 1);

        let spans = rec.recognize("A walk up Ben Nevis takes a day.").unwrap();
        assert_eq!(texts_of(&spans), vec!["Ben Nevis"]);
        assert_eq!(spans[0].kind, EntityKind::Place);
    }

    #[test]
    fn test_heuristic_steers_kinds_by_cue_words() {
        let rec = RuleRecognizer::new();
        let spans = rec
            .recognize("They met Dr Paccard beside the Bossons Glacier near the Alpine Club hut.")
            .unwrap();

        let kind_for = |t: &str| spans.iter().find(|s| s.text == t).map(|s| s.kind);
        assert_eq!(kind_for("Dr Paccard"), Some(EntityKind::Person));
        assert_eq!(kind_for("Bossons Glacier"), Some(EntityKind::Place));
        assert_eq!(kind_for("Alpine Club"), Some(EntityKind::Org));
    }

    #[test]
    fn test_heuristic_skips_sentence_case_and_stopwords() {
        let rec = RuleRecognizer::new();
        let spans = rec.recognize("Snow fell heavily. The wind rose.").unwrap();

        assert!(!texts_of(&spans).contains(&"Snow"));
        assert!(!texts_of(&spans).contains(&"The"));
    }

    #[test]
    fn test_heuristic_keeps_mid_sentence_names() {
        let rec = RuleRecognizer::new();
        let spans = rec.recognize("The village of Zermatt sits below it.").unwrap();

        assert!(texts_of(&spans).contains(&"Zermatt"));
    }

    #[test]
    fn test_gazetteer_beats_heuristic_on_same_span() {
        let mut rec = RuleRecognizer::new();
        rec.add_term("Matterhorn", EntityKind::Place);

        let spans = rec.recognize("Whymper reached the Matterhorn summit.").unwrap();
        let matterhorn = spans.iter().find(|s| s.text == "Matterhorn").unwrap();
        assert_eq!(matterhorn.kind, EntityKind::Place);
        assert!((matterhorn.confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_spans_ordered_by_start() {
        let rec = RuleRecognizer::new();
        let spans = rec
            .recognize("In 1865 Edward Whymper climbed it; by 1871 Lucy Walker had too.")
            .unwrap();

        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_empty_text() {
        let rec = RuleRecognizer::new();
        assert!(rec.recognize("").unwrap().is_empty());
    }
}
