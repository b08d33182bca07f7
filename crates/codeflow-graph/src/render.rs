//! Graph renderers.
//!
//! A renderer turns a [`RenderedGraph`] into text. Two ship with the
//! crate: Mermaid flowcharts for humans and JSON for tooling.

use crate::error::Result;
use crate::finalize::{RenderedGraph, StyleClass, VisualEdge};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Consumes finalized nodes and edges.
///
/// Implementations must tolerate duplicate `(source, target)` pairs and
/// edges naming unknown nodes by dropping them.
pub trait GraphRenderer {
    fn render(&self, graph: &RenderedGraph) -> Result<String>;
}

/// Renders a Mermaid `flowchart`.
#[derive(Debug, Clone)]
pub struct MermaidRenderer {
    /// Flow direction: `LR`, `TD`, ...
    pub direction: String,
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self {
            direction: "LR".to_string(),
        }
    }
}

const CLASS_DEFS: [(StyleClass, &str); 4] = [
    (StyleClass::HighlightA, "fill:#ffd8a8,stroke:#e8590c,color:#000"),
    (StyleClass::HighlightB, "fill:#a5d8ff,stroke:#1971c2,color:#000"),
    (StyleClass::Muted, "fill:#f1f3f5,stroke:#adb5bd,color:#868e96"),
    (StyleClass::Inheritance, "stroke-dasharray:4 2"),
];

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn link_color(edge: &VisualEdge) -> Option<&'static str> {
        if edge.classes.contains(&StyleClass::HighlightA) {
            Some("#e8590c")
        } else if edge.classes.contains(&StyleClass::HighlightB) {
            Some("#1971c2")
        } else if edge.classes.contains(&StyleClass::Muted) {
            Some("#adb5bd")
        } else {
            None
        }
    }
}

impl GraphRenderer for MermaidRenderer {
    fn render(&self, graph: &RenderedGraph) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "flowchart {}", self.direction)?;

        for (class, style) in CLASS_DEFS {
            writeln!(out, "    classDef {} {}", class, style)?;
        }

        let mut ids = HashMap::new();
        for (position, node) in graph.nodes.iter().enumerate() {
            if ids.contains_key(node.key.as_str()) {
                continue;
            }
            let id = format!("n{}", position);
            writeln!(out, "    {}[\"{}\"]", id, escape_label(&node.label))?;
            for class in &node.classes {
                writeln!(out, "    class {} {}", id, class)?;
            }
            ids.insert(node.key.as_str(), id);
        }

        let mut seen = HashSet::new();
        let mut link_styles = Vec::new();
        for edge in &graph.edges {
            let (Some(source), Some(target)) =
                (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
            else {
                continue;
            };
            if !seen.insert((source, target)) {
                continue;
            }

            let arrow = match (edge.directed, edge.classes.contains(&StyleClass::Inheritance)) {
                (true, true) => "-.->",
                (true, false) => "-->",
                (false, true) => "-.-",
                (false, false) => "---",
            };
            writeln!(out, "    {} {} {}", source, arrow, target)?;

            if let Some(color) = Self::link_color(edge) {
                link_styles.push((seen.len() - 1, color));
            }
        }

        for (link, color) in link_styles {
            writeln!(out, "    linkStyle {} stroke:{},stroke-width:2px", link, color)?;
        }

        Ok(out)
    }
}

/// Renders the graph as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl GraphRenderer for JsonRenderer {
    fn render(&self, graph: &RenderedGraph) -> Result<String> {
        Ok(serde_json::to_string_pretty(graph)?)
    }
}

/// Escapes characters Mermaid treats specially inside quoted labels.
fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => escaped.push_str("#quot;"),
            '<' => escaped.push_str("#lt;"),
            '>' => escaped.push_str("#gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
