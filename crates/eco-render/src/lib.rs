//! ECO Render - interactive HTML view of a co-occurrence graph
//!
//! Produces a single HTML page that draws the graph with the vis-network
//! force-directed layout. Node size tracks degree, edge width tracks
//! weight, and reference categories become vis groups. Rendering is purely
//! presentational: nothing here changes nodes, edges, or weights.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use eco_core::RenderConfig;
use eco_graph::CoGraph;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while rendering a graph page
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

// ============================================================================
// Dataset Records
// ============================================================================

/// Node record in the shape vis-network expects
#[derive(Debug, Serialize)]
struct VisNode<'a> {
    id: &'a str,
    label: &'a str,
    title: String,
    value: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
}

/// Edge record in the shape vis-network expects
#[derive(Debug, Serialize)]
struct VisEdge<'a> {
    from: &'a str,
    to: &'a str,
    value: u32,
    title: String,
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a graph to an interactive HTML page
pub fn render_html(graph: &CoGraph, config: &RenderConfig, title: &str) -> Result<String> {
    let nodes: Vec<VisNode> = graph
        .nodes()
        .map(|node| {
            let degree = graph.degree(&node.name);
            let tooltip = match &node.category {
                Some(category) => format!(
                    "{}\ncategory: {}\nconnections: {}",
                    node.name, category, degree
                ),
                None => format!("{}\nconnections: {}", node.name, degree),
            };
            VisNode {
                id: &node.name,
                label: &node.name,
                title: tooltip,
                value: degree.max(1),
                group: node.category.as_deref(),
            }
        })
        .collect();

    let edges: Vec<VisEdge> = graph
        .edges()
        .into_iter()
        .map(|(from, to, weight)| VisEdge {
            from,
            to,
            value: weight,
            title: format!("shared entities: {}", weight),
        })
        .collect();

    let options = json!({
        "nodes": {
            "shape": "dot",
            "size": config.node_size,
            "color": {
                "background": config.node_color,
                "border": config.node_border,
            },
            "font": {
                "size": config.font_size,
                "color": config.font_color,
            },
        },
        "edges": {
            "color": config.edge_color,
            "width": config.edge_width,
            "smooth": {
                "type": "continuous",
                "roundness": 0.5,
            },
        },
        "physics": {
            "enabled": true,
            "solver": "forceAtlas2Based",
            "stabilization": {
                "enabled": true,
            },
        },
        "interaction": {
            "hover": true,
            "tooltipDelay": 120,
        },
    });

    let html = include_str!("template.html")
        .replace("__TITLE__", &html_escape(title))
        .replace("__HEIGHT__", &config.height)
        .replace("__WIDTH__", &config.width)
        .replace("__BACKGROUND__", &config.background)
        .replace("__NODES__", &serde_json::to_string(&nodes)?)
        .replace("__EDGES__", &serde_json::to_string(&edges)?)
        .replace("__OPTIONS__", &serde_json::to_string_pretty(&options)?);
    Ok(html)
}

/// Render a graph and write the page to a file
pub fn write_html(
    graph: &CoGraph,
    config: &RenderConfig,
    title: &str,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let html = render_html(graph, config, title)?;
    fs::write(path, html).map_err(|source| RenderError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// Tests
// ============================================================================
