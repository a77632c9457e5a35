use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Resolves a handle name such as `right` or `left-target`.
    pub fn from_handle(handle: &str) -> Option<Self> {
        let base = handle.strip_suffix("-target").unwrap_or(handle);
        match base {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub background: String,
    pub color: String,
    pub padding: f32,
    pub border_radius: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_family: Option<String>,
    pub bold: bool,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            color: "#1a192b".to_string(),
            padding: 10.0,
            border_radius: 3.0,
            width: 150.0,
            font_size: 12.0,
            font_family: None,
            bold: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub style: NodeStyle,
    /// Declared position. Only fixed-layout diagrams rely on it.
    pub position: Position,
    pub source_side: Option<Side>,
    pub target_side: Option<Side>,
}

pub const LABEL_LINE_HEIGHT: f32 = 1.4;

impl Node {
    pub fn label_lines(&self) -> Vec<&str> {
        self.label.split('\n').collect()
    }

    /// Size of the node as drawn on the canvas, derived from its style and
    /// label rather than the layout size of the diagram.
    pub fn rendered_size(&self) -> Size {
        let lines = self.label_lines().len().max(1) as f32;
        let text_height = lines * self.style.font_size * LABEL_LINE_HEIGHT;
        Size::new(
            self.style.width,
            text_height + self.style.padding * 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Bezier,
    SmoothStep,
    Straight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
    pub dasharray: Option<String>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: "#b1b1b7".to_string(),
            stroke_width: 1.0,
            dasharray: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
    pub animated: bool,
    pub marker_end: Option<Marker>,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    /// Opaque payload carried through layout export.
    pub data: Option<Value>,
}

impl Edge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            kind: EdgeKind::default(),
            style: EdgeStyle::default(),
            animated: false,
            marker_end: None,
            source_handle: None,
            target_handle: None,
            data: None,
        }
    }
}

/// Spacing parameters handed to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub node_size: Size,
    pub node_separation: f32,
    pub rank_separation: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_size: Size::new(200.0, 100.0),
            node_separation: 50.0,
            rank_separation: 50.0,
            margin_x: 0.0,
            margin_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutMode {
    /// Positions come from the layout engine unless a saved layout covers them.
    Auto(LayoutOptions),
    /// Positions declared in the node table are the fallback.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    pub width: f32,
    pub height: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub fit_padding: f32,
    pub minimap: bool,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 900.0,
            min_zoom: 0.1,
            max_zoom: 2.0,
            fit_padding: 0.08,
            minimap: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagram {
    /// Tab identifier, e.g. `message-flow`.
    pub id: String,
    /// Name used for saved layouts and exports, e.g. `messageFlow`.
    pub layout_name: String,
    pub title: String,
    pub description: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub layout: LayoutMode,
    pub canvas: CanvasOptions,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges whose endpoints are missing from the node table.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| self.node(&edge.source).is_none() || self.node(&edge.target).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_names_resolve_to_sides() {
        assert_eq!(Side::from_handle("right"), Some(Side::Right));
        assert_eq!(Side::from_handle("left-target"), Some(Side::Left));
        assert_eq!(Side::from_handle("middle"), None);
    }

    #[test]
    fn rendered_size_grows_with_label_lines() {
        let mut node = Node {
            id: "a".to_string(),
            label: "one".to_string(),
            style: NodeStyle::default(),
            position: Position::default(),
            source_side: None,
            target_side: None,
        };
        let single = node.rendered_size();
        node.label = "one\ntwo\nthree".to_string();
        let triple = node.rendered_size();
        assert_eq!(single.width, triple.width);
        assert!(triple.height > single.height);
    }
}
