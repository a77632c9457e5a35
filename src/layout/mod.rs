//! Automatic top-to-bottom graph layout.
//!
//! The default engine wraps `dagre_rust`; [`RankedEngine`] is a small
//! longest-path layered layout used when dagre is unavailable for a graph.
//! Both return top-left corner positions for every input node.

pub mod ranking;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::ir::{Diagram, LayoutOptions, Position, Size};

use self::ranking::{compute_ranks, order_rank_nodes};

const ORDER_PASSES: usize = 4;

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    pub size: Size,
}

#[derive(Debug, Clone)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutInput {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutInput {
    /// Every node of the diagram gets the same layout size.
    pub fn from_diagram(diagram: &Diagram, node_size: Size) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .map(|node| LayoutNode {
                id: node.id.clone(),
                size: node_size,
            })
            .collect();
        let edges = diagram
            .edges
            .iter()
            .map(|edge| LayoutEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();
        Self { nodes, edges }
    }

    /// Edges as index pairs, dropping duplicates and edges with unknown endpoints.
    fn indexed_edges(&self) -> Vec<(usize, usize)> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::new();
        for edge in &self.edges {
            let (Some(&from), Some(&to)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                debug!(source = edge.source.as_str(), target = edge.target.as_str(); "Skipping edge with unknown endpoint");
                continue;
            };
            if seen.insert((from, to)) {
                edges.push((from, to));
            }
        }
        edges
    }

    /// Edges that close a cycle, as `(source, target)` ids.
    pub fn back_edges(&self) -> Vec<(String, String)> {
        let ranking = compute_ranks(self.nodes.len(), &self.indexed_edges());
        ranking
            .back_edges
            .iter()
            .map(|(from, to)| (self.nodes[*from].id.clone(), self.nodes[*to].id.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutcome {
    pub positions: BTreeMap<String, Position>,
    /// Nodes the engine could not place; they sit at the margin origin.
    pub anomalies: Vec<String>,
}

pub trait LayoutEngine {
    fn name(&self) -> &'static str;

    fn compute(&self, input: &LayoutInput, options: &LayoutOptions) -> LayoutOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Dagre,
    Ranked,
}

impl EngineKind {
    pub fn engine(self) -> Box<dyn LayoutEngine> {
        match self {
            Self::Dagre => Box::new(DagreEngine),
            Self::Ranked => Box::new(RankedEngine),
        }
    }
}

fn report_cycles(input: &LayoutInput) {
    let back_edges = input.back_edges();
    if back_edges.is_empty() {
        return;
    }
    let listed: Vec<String> = back_edges
        .iter()
        .map(|(from, to)| format!("{from} -> {to}"))
        .collect();
    warn!(
        "Layout input contains cycles; treating {} edge(s) as back edges: {}",
        listed.len(),
        listed.join(", ")
    );
}

/// Fills in missing or non-finite positions with the margin origin.
fn finish(
    input: &LayoutInput,
    options: &LayoutOptions,
    mut placed: BTreeMap<String, Position>,
) -> LayoutOutcome {
    let fallback = Position::new(options.margin_x, options.margin_y);
    let mut positions = BTreeMap::new();
    let mut anomalies = Vec::new();
    for node in &input.nodes {
        match placed.remove(&node.id) {
            Some(pos) if pos.x.is_finite() && pos.y.is_finite() => {
                positions.insert(node.id.clone(), pos);
            }
            _ => {
                warn!(node = node.id.as_str(); "Layout engine left node unplaced; using fallback position");
                positions.insert(node.id.clone(), fallback);
                anomalies.push(node.id.clone());
            }
        }
    }
    LayoutOutcome {
        positions,
        anomalies,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DagreEngine;

impl LayoutEngine for DagreEngine {
    fn name(&self) -> &'static str {
        "dagre"
    }

    fn compute(&self, input: &LayoutInput, options: &LayoutOptions) -> LayoutOutcome {
        if input.nodes.is_empty() {
            return LayoutOutcome::default();
        }
        report_cycles(input);
        run_or_rank(input, options, || assign_positions_dagre(input, options))
    }
}

/// Runs an external layout, switching to [`RankedEngine`] if it panics.
fn run_or_rank<F>(input: &LayoutInput, options: &LayoutOptions, layout: F) -> LayoutOutcome
where
    F: FnOnce() -> BTreeMap<String, Position>,
{
    match panic::catch_unwind(AssertUnwindSafe(layout)) {
        Ok(placed) => finish(input, options, placed),
        Err(_) => {
            warn!("dagre layout panicked; falling back to ranked layout");
            RankedEngine.compute(input, options)
        }
    }
}

fn assign_positions_dagre(input: &LayoutInput, options: &LayoutOptions) -> BTreeMap<String, Position> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("tb".to_string());
    graph_config.nodesep = Some(options.node_separation);
    graph_config.ranksep = Some(options.rank_separation);
    graph_config.marginx = Some(options.margin_x);
    graph_config.marginy = Some(options.margin_y);
    dagre_graph.set_graph(graph_config);

    for node in &input.nodes {
        let mut dagre_node = DagreNode::default();
        dagre_node.width = node.size.width;
        dagre_node.height = node.size.height;
        dagre_graph.set_node(node.id.clone(), Some(dagre_node));
    }

    for (from, to) in input.indexed_edges() {
        if from == to {
            continue;
        }
        let source = input.nodes[from].id.clone();
        let target = input.nodes[to].id.clone();
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(&source, &target, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut placed = BTreeMap::new();
    for node in &input.nodes {
        let Some(dagre_node) = dagre_graph.node(&node.id) else {
            continue;
        };
        placed.insert(
            node.id.clone(),
            Position::new(
                dagre_node.x - node.size.width / 2.0,
                dagre_node.y - node.size.height / 2.0,
            ),
        );
    }
    debug!("dagre placed {} of {} nodes", placed.len(), input.nodes.len());
    placed
}

/// Layered layout computed in-crate: longest-path ranks, median ordering,
/// ranks centred on the widest one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedEngine;

impl LayoutEngine for RankedEngine {
    fn name(&self) -> &'static str {
        "ranked"
    }

    fn compute(&self, input: &LayoutInput, options: &LayoutOptions) -> LayoutOutcome {
        if input.nodes.is_empty() {
            return LayoutOutcome::default();
        }
        report_cycles(input);
        let placed = assign_positions_ranked(input, options);
        finish(input, options, placed)
    }
}

fn assign_positions_ranked(input: &LayoutInput, options: &LayoutOptions) -> BTreeMap<String, Position> {
    let edges = input.indexed_edges();
    let ranking = compute_ranks(input.nodes.len(), &edges);
    let forward: Vec<(usize, usize)> = edges
        .iter()
        .copied()
        .filter(|edge| !ranking.back_edges.contains(edge))
        .collect();
    let mut rank_nodes = ranking.buckets();
    order_rank_nodes(&mut rank_nodes, &forward, ORDER_PASSES);

    let rank_width = |bucket: &[usize]| -> f32 {
        let widths: f32 = bucket.iter().map(|idx| input.nodes[*idx].size.width).sum();
        widths + options.node_separation * bucket.len().saturating_sub(1) as f32
    };
    let widest = rank_nodes
        .iter()
        .map(|bucket| rank_width(bucket))
        .fold(0.0_f32, f32::max);

    let mut placed = BTreeMap::new();
    let mut y = options.margin_y;
    for bucket in &rank_nodes {
        if bucket.is_empty() {
            continue;
        }
        let mut x = options.margin_x + (widest - rank_width(bucket)) / 2.0;
        let mut tallest: f32 = 0.0;
        for idx in bucket {
            let node = &input.nodes[*idx];
            placed.insert(node.id.clone(), Position::new(x, y));
            x += node.size.width + options.node_separation;
            tallest = tallest.max(node.size.height);
        }
        y += tallest + options.rank_separation;
    }
    placed
}
