//! GraphML interchange
//!
//! The writer emits the conventional attribute-key layout: a string
//! `category` key for nodes (only when at least one node carries a
//! category) and a long `weight` key for edges. The reader resolves data
//! keys through the declared `attr.name` values rather than fixed ids, so
//! graphs written by other tools load as long as they declare those names.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{CoGraph, GraphError, Result};

// ============================================================================
// Writing
// ============================================================================

/// Serialize a graph to a GraphML document
pub fn to_graphml(graph: &CoGraph) -> Result<String> {
    let has_categories = graph.nodes().any(|node| node.category.is_some());
    let (category_key, weight_key) = if has_categories {
        (Some("d0"), "d1")
    } else {
        (None, "d0")
    };

    let mut xml = String::new();
    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        xml,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;
    if let Some(key) = category_key {
        writeln!(
            xml,
            r#"  <key id="{}" for="node" attr.name="category" attr.type="string" />"#,
            key
        )?;
    }
    writeln!(
        xml,
        r#"  <key id="{}" for="edge" attr.name="weight" attr.type="long" />"#,
        weight_key
    )?;
    writeln!(xml, r#"  <graph edgedefault="undirected">"#)?;

    for node in graph.nodes() {
        match (&node.category, category_key) {
            (Some(category), Some(key)) => {
                writeln!(xml, r#"    <node id="{}">"#, xml_escape(&node.name))?;
                writeln!(
                    xml,
                    r#"      <data key="{}">{}</data>"#,
                    key,
                    xml_escape(category)
                )?;
                writeln!(xml, "    </node>")?;
            }
            _ => writeln!(xml, r#"    <node id="{}" />"#, xml_escape(&node.name))?,
        }
    }

    for (source, target, weight) in graph.edges() {
        writeln!(
            xml,
            r#"    <edge source="{}" target="{}">"#,
            xml_escape(source),
            xml_escape(target)
        )?;
        writeln!(xml, r#"      <data key="{}">{}</data>"#, weight_key, weight)?;
        writeln!(xml, "    </edge>")?;
    }

    writeln!(xml, "  </graph>")?;
    writeln!(xml, "</graphml>")?;
    Ok(xml)
}

/// Serialize a graph to a GraphML file
pub fn write_graphml(graph: &CoGraph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let xml = to_graphml(graph)?;
    fs::write(path, xml).map_err(|source| GraphError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// Reading
// ============================================================================

/// GraphML document, reduced to the parts the pipeline exchanges
#[derive(Debug, Deserialize)]
struct GraphmlDoc {
    #[serde(rename = "key", default)]
    keys: Vec<KeyDecl>,
    graph: GraphElem,
}

#[derive(Debug, Deserialize)]
struct KeyDecl {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@for", default)]
    domain: String,
    #[serde(rename = "@attr.name", default)]
    attr_name: String,
}

#[derive(Debug, Deserialize)]
struct GraphElem {
    #[serde(rename = "node", default)]
    nodes: Vec<NodeElem>,
    #[serde(rename = "edge", default)]
    edges: Vec<EdgeElem>,
}

#[derive(Debug, Deserialize)]
struct NodeElem {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "data", default)]
    data: Vec<DataElem>,
}

#[derive(Debug, Deserialize)]
struct EdgeElem {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "@target")]
    target: String,
    #[serde(rename = "data", default)]
    data: Vec<DataElem>,
}

#[derive(Debug, Deserialize)]
struct DataElem {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

/// Parse a GraphML document.
///
/// Edge weights default to one when no weight key or datum is present.
/// An edge naming an undeclared node is an error.
pub fn from_graphml(xml: &str) -> Result<CoGraph> {
    // quick-xml is lenient about the root element, so check it explicitly
    if !xml.contains("<graphml") {
        return Err(GraphError::Malformed(
            "missing graphml root element".to_string(),
        ));
    }

    let doc: GraphmlDoc =
        quick_xml::de::from_str(xml).map_err(|e| GraphError::Malformed(e.to_string()))?;

    let mut category_key = None;
    let mut weight_key = None;
    for key in &doc.keys {
        match (key.domain.as_str(), key.attr_name.as_str()) {
            ("node", "category") | ("all", "category") => category_key = Some(key.id.as_str()),
            ("edge", "weight") | ("all", "weight") => weight_key = Some(key.id.as_str()),
            _ => {}
        }
    }

    let mut graph = CoGraph::new();
    for node in &doc.graph.nodes {
        let category = category_key
            .and_then(|key| node.data.iter().find(|data| data.key == key))
            .map(|data| data.value.clone());
        graph.insert_node(node.id.clone(), category);
    }
    for edge in &doc.graph.edges {
        let datum = weight_key.and_then(|key| edge.data.iter().find(|data| data.key == key));
        let weight = match datum {
            Some(data) => data.value.trim().parse::<u32>().map_err(|_| {
                GraphError::Malformed(format!("invalid edge weight {:?}", data.value))
            })?,
            None => 1,
        };
        graph.insert_edge(&edge.source, &edge.target, weight)?;
    }
    Ok(graph)
}

/// Parse a GraphML file
pub fn read_graphml(path: impl AsRef<Path>) -> Result<CoGraph> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path).map_err(|source| GraphError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    from_graphml(&xml)
}

// ============================================================================
// Tests
// ============================================================================
