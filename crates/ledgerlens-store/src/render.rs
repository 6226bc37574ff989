//! Interactive graph rendering
//!
//! Produces one standalone HTML page per document. Nodes and edges are
//! embedded as JSON and drawn by vis-network loaded from a CDN, with a
//! fixed force-directed layout.

use crate::error::StoreError;
use ledgerlens_domain::KnowledgeGraph;
use serde::Serialize;
use serde_json::json;

/// vis-network bundle used by rendered pages
pub const VIS_NETWORK_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.2/dist/vis-network.min.js";

/// Visual settings for rendered graphs
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Page and canvas background color
    pub background: String,
    /// Label color
    pub font_color: String,
    /// forceAtlas2Based gravitational constant (negative repels)
    pub gravitational_constant: f64,
    /// forceAtlas2Based central gravity
    pub central_gravity: f64,
    /// Resting edge length
    pub spring_length: f64,
    /// Edge stiffness
    pub spring_constant: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: "#222222".to_string(),
            font_color: "white".to_string(),
            gravitational_constant: -100.0,
            central_gravity: 0.005,
            spring_length: 230.0,
            spring_constant: 0.18,
        }
    }
}

#[derive(Serialize)]
struct VisNode<'a> {
    id: &'a str,
    label: &'a str,
    title: String,
    group: &'a str,
}

#[derive(Serialize)]
struct VisEdge<'a> {
    from: &'a str,
    to: &'a str,
    label: &'a str,
    arrows: &'static str,
}

/// Renders knowledge graphs as standalone HTML pages
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    options: RenderOptions,
}

impl GraphRenderer {
    /// Create a renderer with custom options
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// The options in use
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `graph` as a complete HTML document titled `title`
    pub fn render(&self, graph: &KnowledgeGraph, title: &str) -> Result<String, StoreError> {
        let nodes: Vec<VisNode<'_>> = graph
            .nodes()
            .iter()
            .map(|n| VisNode {
                id: &n.id,
                label: &n.id,
                title: format!("Type: {}", n.node_type),
                group: &n.node_type,
            })
            .collect();

        let edges: Vec<VisEdge<'_>> = graph
            .relationships()
            .iter()
            .map(|r| VisEdge {
                from: &r.source,
                to: &r.target,
                label: &r.rel_type,
                arrows: "to",
            })
            .collect();

        let nodes_json = script_json(&nodes)?;
        let edges_json = script_json(&edges)?;
        let options_json = script_json(&self.network_options())?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{vis}"></script>
<style>
  html, body {{ margin: 0; height: 100%; background-color: {bg}; }}
  #graph {{ width: 100%; height: 100%; background-color: {bg}; }}
</style>
</head>
<body>
<div id="graph"></div>
<script>
  var nodes = new vis.DataSet({nodes});
  var edges = new vis.DataSet({edges});
  var options = {options};
  var network = new vis.Network(document.getElementById("graph"), {{ nodes: nodes, edges: edges }}, options);
</script>
</body>
</html>
"#,
            title = escape_html(title),
            vis = VIS_NETWORK_JS,
            bg = escape_html(&self.options.background),
            nodes = nodes_json,
            edges = edges_json,
            options = options_json,
        ))
    }

    fn network_options(&self) -> serde_json::Value {
        let o = &self.options;
        json!({
            "nodes": { "font": { "color": o.font_color } },
            "edges": { "font": { "color": o.font_color, "strokeWidth": 0 }, "arrows": { "to": { "enabled": true } } },
            "interaction": { "navigationButtons": true, "keyboard": { "enabled": true } },
            "physics": {
                "solver": "forceAtlas2Based",
                "forceAtlas2Based": {
                    "gravitationalConstant": o.gravitational_constant,
                    "centralGravity": o.central_gravity,
                    "springLength": o.spring_length,
                    "springConstant": o.spring_constant
                }
            }
        })
    }
}

/// Serialize for embedding inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Render(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_domain::{Node, Relationship};

    fn sample_graph() -> KnowledgeGraph {
        KnowledgeGraph::new(
            vec![Node::new("Acme", "Company"), Node::new("Cloud", "Business Segment")],
            vec![
                Relationship::new("Acme", "Cloud", "HAS_SEGMENT"),
                Relationship::new("Acme", "Jane Doe", "LED_BY"),
            ],
        )
    }

    #[test]
    fn test_render_contains_nodes_and_edges() {
        let html = GraphRenderer::default().render(&sample_graph(), "acme-10k").unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>acme-10k</title>"));
        assert!(html.contains(r#""title":"Type: Company""#));
        assert!(html.contains(r#""group":"Business Segment""#));
        assert!(html.contains(r#""label":"HAS_SEGMENT""#));
        assert!(html.contains(r#""title":"Type: Unknown""#));
        assert!(html.contains(VIS_NETWORK_JS));
    }

    #[test]
    fn test_render_layout_options() {
        let html = GraphRenderer::default().render(&sample_graph(), "x").unwrap();

        assert!(html.contains(r#""solver":"forceAtlas2Based""#));
        assert!(html.contains(r#""springLength":230.0"#));
        assert!(html.contains(r#""navigationButtons":true"#));
        assert!(html.contains("#222222"));
    }

    #[test]
    fn test_script_breakout_is_escaped() {
        let graph = KnowledgeGraph::new(
            vec![Node::new("</script><script>alert(1)</script>", "Company")],
            vec![],
        );
        let html = GraphRenderer::default().render(&graph, "<b>x</b>").unwrap();

        assert!(!html.contains("</script><script>alert"));
        assert!(html.contains("<title>&lt;b&gt;x&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_empty_graph_renders() {
        let html = GraphRenderer::default()
            .render(&KnowledgeGraph::default(), "empty")
            .unwrap();
        assert!(html.contains("new vis.DataSet([])"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"A&B "c" <d>"#), "A&amp;B &quot;c&quot; &lt;d&gt;");
    }
}
