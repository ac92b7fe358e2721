//! ECO CLI - co-occurrence pipeline commands
//!
//! Usage:
//!   eco extract <corpus> --out mapping.json [--reference names.json]
//!   eco filter <mapping> --reference names.json --out filtered.json
//!   eco graph <mapping> --out graph.graphml [--reference names.json]
//!   eco render <graph> --out graph.html [--title TITLE]
//!   eco coverage <mapping> --expected names.txt

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;

use eco_core::{EntityMapping, MissingHeading, PipelineConfig, ReferenceTable};
use eco_corpus::Segmenter;
use eco_extractor::{
    check_coverage, filter_mapping, parse_expected, EntityKind, ExtractOptions,
    ExtractionContext, RuleRecognizer,
};
use eco_graph::{read_graphml, write_graphml, CoGraph};
use eco_render::write_html;

#[derive(Parser)]
#[command(name = "eco")]
#[command(about = "Entity co-occurrence graphs from heading-structured corpora")]
#[command(version)]
struct Cli {
    /// Path to an eco.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities for every heading section of a corpus
    Extract {
        /// Corpus text file
        corpus: PathBuf,
        /// Where to write the heading-to-entities mapping (JSON)
        #[arg(long)]
        out: PathBuf,
        /// Reference table used to seed the recognizer gazetteer
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Heading marker word, overriding the configuration
        #[arg(long)]
        marker: Option<String>,
        /// Keep every recognized entity kind
        #[arg(long)]
        keep_all: bool,
    },
    /// Restrict a mapping to canonical display names
    Filter {
        /// Mapping produced by extract (JSON)
        mapping: PathBuf,
        /// Reference table of canonical names (JSON)
        #[arg(long)]
        reference: PathBuf,
        /// Where to write the filtered mapping (JSON)
        #[arg(long)]
        out: PathBuf,
        /// Skip headings missing from the reference instead of failing
        #[arg(long)]
        skip_missing: bool,
    },
    /// Build the co-occurrence graph from a mapping
    Graph {
        /// Mapping file (JSON)
        mapping: PathBuf,
        /// Where to write the graph (GraphML)
        #[arg(long)]
        out: PathBuf,
        /// Reference table supplying node categories
        #[arg(long)]
        reference: Option<PathBuf>,
    },
    /// Render a graph as an interactive HTML page
    Render {
        /// Graph file (GraphML)
        graph: PathBuf,
        /// Where to write the page
        #[arg(long)]
        out: PathBuf,
        /// Page title
        #[arg(long)]
        title: Option<String>,
    },
    /// Report which expected headings a mapping covers
    Coverage {
        /// Mapping file (JSON)
        mapping: PathBuf,
        /// Text file with one expected heading per line
        #[arg(long)]
        expected: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            corpus,
            out,
            reference,
            marker,
            keep_all,
        } => cmd_extract(&config, &corpus, &out, reference.as_deref(), marker, keep_all),
        Commands::Filter {
            mapping,
            reference,
            out,
            skip_missing,
        } => cmd_filter(&config, &mapping, &reference, &out, skip_missing),
        Commands::Graph {
            mapping,
            out,
            reference,
        } => cmd_graph(&config, &mapping, &out, reference.as_deref()),
        Commands::Render { graph, out, title } => cmd_render(&config, &graph, &out, title),
        Commands::Coverage { mapping, expected } => cmd_coverage(&config, &mapping, &expected),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::from_file(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn cmd_extract(
    config: &PipelineConfig,
    corpus: &Path,
    out: &Path,
    reference: Option<&Path>,
    marker: Option<String>,
    keep_all: bool,
) -> anyhow::Result<()> {
    let marker = marker.unwrap_or_else(|| config.corpus.marker.clone());
    let segmenter = Segmenter::new(&marker)?;
    let segments = segmenter.segment_file(corpus)?;
    info!("segmented {} into {} sections", corpus.display(), segments.len());

    let mut recognizer = RuleRecognizer::new();
    if config.extract.seed_from_reference {
        if let Some(path) = reference {
            let table = ReferenceTable::load(path)?;
            let kind: EntityKind = config.extract.seed_kind.parse()?;
            recognizer.seed_from_reference(&table, kind);
            info!("seeded gazetteer, {} terms total", recognizer.term_count());
        }
    }

    let mut options = ExtractOptions::from_config(&config.extract)?;
    if keep_all {
        options.keep_all = true;
    }

    let context = ExtractionContext::new(Box::new(recognizer), options);
    let (mapping, summary) = context.extract_corpus(&segments)?;
    mapping.save(out)?;

    println!("{}", summary.report());
    println!("Wrote {} headings to {}", mapping.len(), out.display());
    Ok(())
}

fn cmd_filter(
    config: &PipelineConfig,
    mapping: &Path,
    reference: &Path,
    out: &Path,
    skip_missing: bool,
) -> anyhow::Result<()> {
    let mapping = EntityMapping::load(mapping)?;
    let table = ReferenceTable::load(reference)?;
    let policy = if skip_missing {
        MissingHeading::Skip
    } else {
        config.filter.on_missing
    };

    let filtered = filter_mapping(&mapping, &table, policy, config.matching.case_fold)?;
    filtered.save(out)?;

    println!(
        "Kept {} canonical names across {} headings, wrote {}",
        filtered.entity_count(),
        filtered.len(),
        out.display()
    );
    Ok(())
}

fn cmd_graph(
    config: &PipelineConfig,
    mapping: &Path,
    out: &Path,
    reference: Option<&Path>,
) -> anyhow::Result<()> {
    let mapping = EntityMapping::load(mapping)?;
    let table = match reference {
        Some(path) => Some(ReferenceTable::load(path)?),
        None => None,
    };

    let graph = CoGraph::build(&mapping, table.as_ref(), config.matching.case_fold);
    write_graphml(&graph, out)?;

    println!("{}", graph.summary().report());
    println!("Wrote {}", out.display());
    Ok(())
}

fn cmd_render(
    config: &PipelineConfig,
    graph: &Path,
    out: &Path,
    title: Option<String>,
) -> anyhow::Result<()> {
    let graph = read_graphml(graph)?;
    let title = title.unwrap_or_else(|| "Co-occurrence graph".to_string());
    write_html(&graph, &config.render, &title, out)?;

    println!(
        "Rendered {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        out.display()
    );
    Ok(())
}

fn cmd_coverage(config: &PipelineConfig, mapping: &Path, expected: &Path) -> anyhow::Result<()> {
    let mapping = EntityMapping::load(mapping)?;
    let text = std::fs::read_to_string(expected)
        .with_context(|| format!("Failed to read {}", expected.display()))?;

    let names = parse_expected(&text);
    let report = check_coverage(&mapping, &names, config.matching.case_fold);
    println!("{}", report.report());
    Ok(())
}
