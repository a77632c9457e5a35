//! Position resolution: saved layout first, automatic layout for the rest.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::ir::{Diagram, Edge, LayoutMode, Node, Position};
use crate::layout::{LayoutEngine, LayoutInput};
use crate::saved_layout::{LayoutSource, PositionMap, load_override};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    Override,
    Auto,
    Static,
}

#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub node: Node,
    pub position: Position,
    pub source: PositionSource,
}

#[derive(Debug, Clone)]
pub struct ResolvedDiagram {
    pub diagram_id: String,
    pub layout_name: String,
    pub nodes: Vec<ResolvedNode>,
    pub edges: Vec<Edge>,
    /// Nodes the layout engine failed to place.
    pub anomalies: Vec<String>,
}

impl ResolvedDiagram {
    pub fn position(&self, node_id: &str) -> Option<Position> {
        self.nodes
            .iter()
            .find(|resolved| resolved.node.id == node_id)
            .map(|resolved| resolved.position)
    }

    pub fn positions(&self) -> BTreeMap<String, Position> {
        self.nodes
            .iter()
            .map(|resolved| (resolved.node.id.clone(), resolved.position))
            .collect()
    }
}

/// Resolves node positions for one diagram activation.
pub struct PositionResolver<'a> {
    source: &'a dyn LayoutSource,
    engine: &'a dyn LayoutEngine,
}

impl<'a> PositionResolver<'a> {
    pub fn new(source: &'a dyn LayoutSource, engine: &'a dyn LayoutEngine) -> Self {
        Self { source, engine }
    }

    pub fn resolve(&self, diagram: &Diagram) -> ResolvedDiagram {
        let saved = load_override(self.source, &diagram.layout_name);
        if let Some(saved) = &saved {
            let unknown: Vec<&String> = saved
                .keys()
                .filter(|id| diagram.node(id).is_none())
                .collect();
            if !unknown.is_empty() {
                debug!(
                    "Saved layout {} names unknown nodes: {:?}",
                    diagram.layout_name, unknown
                );
            }
        }
        self.resolve_with(diagram, saved.as_ref())
    }

    /// Resolution with an already loaded override. `None` means no saved
    /// layout exists.
    pub fn resolve_with(&self, diagram: &Diagram, saved: Option<&PositionMap>) -> ResolvedDiagram {
        let covered = |node: &Node| saved.is_some_and(|map| map.contains_key(&node.id));
        let fully_covered = diagram.nodes.iter().all(covered);

        let mut anomalies = Vec::new();
        let auto_positions = match diagram.layout {
            LayoutMode::Auto(options) if !fully_covered => {
                let input = LayoutInput::from_diagram(diagram, options.node_size);
                let outcome = self.engine.compute(&input, &options);
                debug!(
                    "{} engine laid out {} nodes for {}",
                    self.engine.name(),
                    outcome.positions.len(),
                    diagram.layout_name
                );
                anomalies = outcome.anomalies;
                Some(outcome.positions)
            }
            _ => None,
        };

        let nodes = diagram
            .nodes
            .iter()
            .map(|node| {
                let saved_position = saved.and_then(|map| map.get(&node.id)).copied();
                let auto_position = auto_positions
                    .as_ref()
                    .and_then(|positions| positions.get(&node.id))
                    .copied();
                let (position, source) = match (saved_position, auto_position) {
                    (Some(position), _) => (position, PositionSource::Override),
                    (None, Some(position)) => (position, PositionSource::Auto),
                    (None, None) => (node.position, PositionSource::Static),
                };
                ResolvedNode {
                    node: node.clone(),
                    position,
                    source,
                }
            })
            .collect::<Vec<_>>();

        let overridden = nodes
            .iter()
            .filter(|resolved| resolved.source == PositionSource::Override)
            .count();
        info!(
            "Resolved {} ({} nodes, {} from saved layout)",
            diagram.layout_name,
            nodes.len(),
            overridden
        );

        ResolvedDiagram {
            diagram_id: diagram.id.clone(),
            layout_name: diagram.layout_name.clone(),
            nodes,
            edges: diagram.edges.clone(),
            anomalies,
        }
    }
}
