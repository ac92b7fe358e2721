//! Coverage check
//!
//! Compares an expected-headings list against a mapping's keys and reports
//! what the extraction run found and what it missed. Purely informational;
//! the check never modifies the mapping.

use std::collections::BTreeSet;

use eco_core::{match_key, EntityMapping};

/// Result of comparing an expected-headings list against a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Number of expected headings (duplicates counted per line)
    pub expected: usize,

    /// How many of them appear in the mapping
    pub found: usize,

    /// Expected headings absent from the mapping, in list order
    pub missing: Vec<String>,
}

impl CoverageReport {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        let mut out = format!(
            "=== Coverage Report ===\n\n\
             Expected headings: {}\n\
             Found:             {}\n\
             Missing:           {}\n",
            self.expected,
            self.found,
            self.missing_count()
        );

        if !self.missing.is_empty() {
            out.push_str("\nMissing headings:\n");
            for name in &self.missing {
                out.push_str(&format!("  - {}\n", name));
            }
        }

        out
    }
}

/// Parse a newline-delimited expected-headings list
///
/// Lines are trimmed; blank lines are skipped.
pub fn parse_expected(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check which expected headings the mapping covers
pub fn check_coverage(
    mapping: &EntityMapping,
    expected: &[String],
    case_fold: bool,
) -> CoverageReport {
    let keys: BTreeSet<String> = mapping
        .headings()
        .map(|h| match_key(h, case_fold))
        .collect();

    let mut found = 0;
    let mut missing = Vec::new();
    for name in expected {
        if keys.contains(&match_key(name, case_fold)) {
            found += 1;
        } else {
            missing.push(name.clone());
        }
    }

    CoverageReport {
        expected: expected.len(),
        found,
        missing,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(headings: &[&str]) -> EntityMapping {
        let mut mapping = EntityMapping::new();
        for heading in headings {
            mapping.insert(heading.to_string(), Vec::new());
        }
        mapping
    }

    fn expected(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_missing_equals_expected_minus_found() {
        let mapping = mapping(&["Eiger", "Monch"]);
        let expected = expected(&["Eiger", "Monch", "Jungfrau", "Wetterhorn"]);

        let report = check_coverage(&mapping, &expected, true);
        assert_eq!(report.expected, 4);
        assert_eq!(report.found, 2);
        assert_eq!(report.missing_count(), report.expected - report.found);
        assert_eq!(report.missing, vec!["Jungfrau", "Wetterhorn"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_duplicate_expected_lines_counted_per_line() {
        let mapping = mapping(&["Eiger"]);
        let expected = expected(&["Eiger", "Eiger", "Jungfrau", "Jungfrau"]);

        let report = check_coverage(&mapping, &expected, true);
        assert_eq!(report.expected, 4);
        assert_eq!(report.found, 2);
        assert_eq!(report.missing_count(), 2);
    }

    #[test]
    fn test_case_fold_applies_to_coverage() {
        let mapping = mapping(&["Ben Nevis"]);

        let folded = check_coverage(&mapping, &expected(&["ben nevis"]), true);
        assert!(folded.is_complete());

        let exact = check_coverage(&mapping, &expected(&["ben nevis"]), false);
        assert_eq!(exact.missing_count(), 1);
    }

    #[test]
    fn test_parse_expected_skips_blanks_and_trims() {
        let text = "Eiger\n\n  Jungfrau  \n\nMonch\n";
        assert_eq!(parse_expected(text), vec!["Eiger", "Jungfrau", "Monch"]);
        assert!(parse_expected("\n\n").is_empty());
    }

    #[test]
    fn test_full_coverage() {
        let mapping = mapping(&["Eiger"]);
        let report = check_coverage(&mapping, &expected(&["Eiger"]), true);

        assert!(report.is_complete());
        assert_eq!(report.missing_count(), 0);
    }

    #[test]
    fn test_report_lists_missing_names() {
        let mapping = mapping(&["Eiger"]);
        let report = check_coverage(&mapping, &expected(&["Eiger", "Olympus Mons"]), true);

        let text = report.report();
        assert!(text.contains("Expected headings: 2"));
        assert!(text.contains("Found:             1"));
        assert!(text.contains("  - Olympus Mons"));
    }
}
