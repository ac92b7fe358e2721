//! ECO Graph - heading co-occurrence graph
//!
//! Builds the weighted undirected graph over corpus headings: two headings
//! are connected when at least one entity appears under both, and the edge
//! weight is the number of distinct shared entities. Duplicate entity
//! occurrences under one heading never inflate a weight.
//!
//! Construction is deterministic. Nodes are added in sorted heading order
//! and edges in sorted pair order, so the same mapping always yields the
//! same graph and the same serialized bytes.
//!
//! GraphML reading and writing lives in [`graphml`].

pub mod graphml;

pub use graphml::{from_graphml, read_graphml, to_graphml, write_graphml};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use eco_core::{match_key, EntityMapping, ReferenceTable};

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while building or exchanging co-occurrence graphs
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed GraphML: {0}")]
    Malformed(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

// ============================================================================
// Heading Nodes
// ============================================================================

/// Node payload: one corpus heading, with its reference category when known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    /// Heading text exactly as it appears in the mapping
    pub name: String,

    /// Category from the reference table, when one was supplied
    pub category: Option<String>,
}

// ============================================================================
// Co-occurrence Graph
// ============================================================================

/// Undirected heading graph with shared-entity counts as edge weights
#[derive(Debug, Clone, Default)]
pub struct CoGraph {
    graph: UnGraph<HeadingNode, u32>,
    index: HashMap<String, NodeIndex>,
}

impl CoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a mapping.
    ///
    /// Every mapping key becomes a node, including headings that share no
    /// entity with any other. When a reference table is given, each node
    /// picks up the category of its reference entry, matched through the
    /// same comparison keys the rest of the pipeline uses.
    pub fn build(
        mapping: &EntityMapping,
        reference: Option<&ReferenceTable>,
        case_fold: bool,
    ) -> Self {
        let categories = reference.map(|table| table.key_index(case_fold));

        let mut graph = Self::new();
        for heading in mapping.headings() {
            let category = categories
                .as_ref()
                .and_then(|index| index.get(&match_key(heading, case_fold)))
                .and_then(|entry| entry.category.clone());
            graph.insert_node(heading.clone(), category);
        }

        let occurrences = invert_mapping(mapping, case_fold);
        for ((a, b), weight) in count_pairs(&occurrences) {
            // pair members are mapping keys, so both nodes already exist
            if let (Some(&a_ix), Some(&b_ix)) = (graph.index.get(&a), graph.index.get(&b)) {
                graph.graph.update_edge(a_ix, b_ix, weight);
            }
        }
        graph
    }

    /// Add a node, or return the existing one with that name unchanged
    pub fn insert_node(&mut self, name: impl Into<String>, category: Option<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&ix) = self.index.get(&name) {
            return ix;
        }
        let ix = self.graph.add_node(HeadingNode {
            name: name.clone(),
            category,
        });
        self.index.insert(name, ix);
        ix
    }

    /// Add or replace the edge between two existing nodes
    pub fn insert_edge(&mut self, a: &str, b: &str, weight: u32) -> Result<()> {
        let a_ix = *self
            .index
            .get(a)
            .ok_or_else(|| GraphError::UnknownNode(a.to_string()))?;
        let b_ix = *self
            .index
            .get(b)
            .ok_or_else(|| GraphError::UnknownNode(b.to_string()))?;
        self.graph.update_edge(a_ix, b_ix, weight);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Category recorded for a heading, when the node exists and has one
    pub fn category(&self, name: &str) -> Option<&str> {
        let ix = *self.index.get(name)?;
        self.graph[ix].category.as_deref()
    }

    /// Nodes in insertion order, which for built graphs is sorted order
    pub fn nodes(&self) -> impl Iterator<Item = &HeadingNode> {
        self.graph.node_weights()
    }

    /// Edges as (source, target, weight) in insertion order
    pub fn edges(&self) -> Vec<(&str, &str, u32)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].name.as_str(),
                    self.graph[edge.target()].name.as_str(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    /// Weight of the edge between two headings, if both exist and share one
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let a_ix = *self.index.get(a)?;
        let b_ix = *self.index.get(b)?;
        let edge = self.graph.find_edge(a_ix, b_ix)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Number of headings connected to this one, zero for unknown names
    pub fn degree(&self, name: &str) -> usize {
        match self.index.get(name) {
            Some(&ix) => self.graph.neighbors(ix).count(),
            None => 0,
        }
    }

    pub fn isolated_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&ix| self.graph.neighbors(ix).next().is_none())
            .count()
    }

    pub fn summary(&self) -> GraphSummary {
        let mut pairs: Vec<(String, String, u32)> = self
            .edges()
            .into_iter()
            .map(|(a, b, weight)| (a.to_string(), b.to_string(), weight))
            .collect();
        let total_weight = pairs.iter().map(|(_, _, weight)| u64::from(*weight)).sum();
        pairs.sort_by(|x, y| {
            y.2.cmp(&x.2)
                .then_with(|| x.0.cmp(&y.0))
                .then_with(|| x.1.cmp(&y.1))
        });
        pairs.truncate(5);

        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            isolated: self.isolated_count(),
            total_weight,
            top_pairs: pairs,
        }
    }
}

// ============================================================================
// Inversion and Pair Counting
// ============================================================================

/// Invert a mapping into entity occurrences: which headings mention each
/// entity. Keys are comparison keys (see [`match_key`]), values keep the
/// original heading surfaces.
pub fn invert_mapping(
    mapping: &EntityMapping,
    case_fold: bool,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut occurrences: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (heading, entities) in mapping.iter() {
        for entity in entities {
            occurrences
                .entry(match_key(entity, case_fold))
                .or_default()
                .insert(heading.clone());
        }
    }
    occurrences
}

/// Count unordered heading pairs across entity occurrences. Every entity
/// shared by two headings contributes one to their pair, so the final count
/// is the number of distinct shared entities. Pair keys are lexicographic,
/// smaller heading first.
pub fn count_pairs(
    occurrences: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<(String, String), u32> {
    let mut pairs: BTreeMap<(String, String), u32> = BTreeMap::new();
    for headings in occurrences.values() {
        let list: Vec<&String> = headings.iter().collect();
        for i in 0..list.len() {
            for j in (i + 1)..list.len() {
                // set iteration is sorted, so (i, j) is already lexicographic
                *pairs
                    .entry((list[i].clone(), list[j].clone()))
                    .or_insert(0) += 1;
            }
        }
    }
    pairs
}

// ============================================================================
// Graph Summary
// ============================================================================

/// Shape of a built graph, for log lines and operator reports
#[derive(Debug, Clone)]
pub struct GraphSummary {
    /// Number of headings
    pub nodes: usize,

    /// Number of connections
    pub edges: usize,

    /// Headings that share no entity with any other
    pub isolated: usize,

    /// Sum of all edge weights
    pub total_weight: u64,

    /// Up to five heaviest edges, heaviest first
    pub top_pairs: Vec<(String, String, u32)>,
}

impl GraphSummary {
    /// Human-readable report
    pub fn report(&self) -> String {
        let mut report = format!(
            "=== Graph Summary ===\n\n\
             Headings (nodes): {}\n\
             Connections (edges): {}\n\
             Isolated headings: {}\n\
             Total edge weight: {}\n",
            self.nodes, self.edges, self.isolated, self.total_weight
        );
        if !self.top_pairs.is_empty() {
            report.push_str("\nStrongest connections:\n");
            for (a, b, weight) in &self.top_pairs {
                report.push_str(&format!("  {} -- {} ({})\n", a, b, weight));
            }
        }
        report
    }
}

// ============================================================================
// Tests
// ============================================================================
