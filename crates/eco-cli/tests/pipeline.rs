//! Pipeline Integration Tests
//!
//! Drives the full chain through the library APIs: segment a corpus,
//! extract entities, filter to canonical names, build the graph, and
//! exchange it through GraphML and HTML.
//!
//! Author: hephaex@gmail.com

use std::collections::BTreeMap;

use tempfile::tempdir;

use eco_core::{EntityMapping, MissingHeading, PipelineConfig, ReferenceEntry, ReferenceTable};
use eco_corpus::Segmenter;
use eco_extractor::{
    check_coverage, filter_mapping, parse_expected, EntityKind, ExtractOptions,
    ExtractionContext, RuleRecognizer,
};
use eco_graph::{read_graphml, write_graphml, CoGraph};
use eco_render::render_html;

const CORPUS: &str = "\
About Chamonix
The town sits below Mont Blanc, and many visitors continue on to Zermatt.

About Mont Blanc
Climbers usually start from Chamonix.

About Zermatt
A quieter valley, a long way from Chamonix.
";

/// Reference table with the three alpine names the corpus mentions
fn reference_table() -> ReferenceTable {
    let mut entries = BTreeMap::new();
    for (key, display, category) in [
        ("chamonix", "Chamonix", "town"),
        ("mont blanc", "Mont Blanc", "mountain"),
        ("zermatt", "Zermatt", "town"),
    ] {
        entries.insert(
            key.to_string(),
            ReferenceEntry {
                display_name: display.to_string(),
                category: Some(category.to_string()),
            },
        );
    }
    ReferenceTable { entries }
}

#[test]
fn test_corpus_to_rendered_page() {
    let table = reference_table();

    let segments = Segmenter::new("About").unwrap().segment_text(CORPUS);
    assert_eq!(segments.len(), 3);

    let mut recognizer = RuleRecognizer::new();
    recognizer.seed_from_reference(&table, EntityKind::Place);
    let context = ExtractionContext::new(Box::new(recognizer), ExtractOptions::default());
    let (mapping, summary) = context.extract_corpus(&segments).unwrap();

    assert_eq!(mapping.len(), 3);
    assert!(summary.report().contains("=== Extraction Summary ==="));

    let expected = parse_expected("Chamonix\nMont Blanc\nZermatt\nUnknown Peak\n");
    let coverage = check_coverage(&mapping, &expected, true);
    assert_eq!(coverage.expected, 4);
    assert_eq!(coverage.found, 3);
    assert_eq!(coverage.missing, vec!["Unknown Peak".to_string()]);

    let filtered = filter_mapping(&mapping, &table, MissingHeading::Fail, true).unwrap();
    assert_eq!(
        filtered.get("Chamonix").unwrap(),
        &[
            "Chamonix".to_string(),
            "Mont Blanc".to_string(),
            "Zermatt".to_string()
        ]
    );
    assert_eq!(
        filtered.get("Mont Blanc").unwrap(),
        &["Chamonix".to_string(), "Mont Blanc".to_string()]
    );
    assert_eq!(
        filtered.get("Zermatt").unwrap(),
        &["Chamonix".to_string(), "Zermatt".to_string()]
    );

    let graph = CoGraph::build(&filtered, Some(&table), true);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.weight("Chamonix", "Mont Blanc"), Some(2));
    assert_eq!(graph.weight("Chamonix", "Zermatt"), Some(2));
    assert_eq!(graph.weight("Mont Blanc", "Zermatt"), Some(1));
    assert_eq!(graph.category("Chamonix"), Some("town"));

    let dir = tempdir().unwrap();
    let graph_path = dir.path().join("graph.graphml");
    write_graphml(&graph, &graph_path).unwrap();
    let restored = read_graphml(&graph_path).unwrap();
    assert_eq!(restored.weight("Chamonix", "Mont Blanc"), Some(2));
    assert_eq!(restored.category("Mont Blanc"), Some("mountain"));

    let html = render_html(
        &restored,
        &PipelineConfig::default().render,
        "Alpine corpus",
    )
    .unwrap();
    assert!(html.contains(r#""id":"Chamonix""#));
    assert!(html.contains("<title>Alpine corpus</title>"));
}

#[test]
fn test_mapping_files_round_trip_between_stages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mapping.json");

    let mut mapping = EntityMapping::new();
    mapping.insert("A", vec!["x".to_string(), "y".to_string()]);
    mapping.insert("B", vec!["y".to_string()]);
    mapping.save(&path).unwrap();

    let loaded = EntityMapping::load(&path).unwrap();
    let graph = CoGraph::build(&loaded, None, true);
    assert_eq!(graph.weight("A", "B"), Some(1));
}

#[test]
fn test_config_file_drives_the_pipeline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eco.toml");
    std::fs::write(
        &path,
        "[corpus]\nmarker = \"Chapter\"\n\n[matching]\ncase_fold = false\n\n[render]\nbackground = \"#101010\"\n",
    )
    .unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(config.corpus.marker, "Chapter");
    assert!(!config.matching.case_fold);
    assert_eq!(config.render.background, "#101010");

    let segments = Segmenter::new(&config.corpus.marker)
        .unwrap()
        .segment_text("Chapter One\nalpha\n\nChapter Two\nbeta\n");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].heading, "One");
    assert_eq!(segments[0].body, "alpha");
}
