use crate::canvas::{Canvas, Viewport};
use crate::render::edge_geometry;
use crate::resolve::{PositionSource, ResolvedDiagram};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub diagram: String,
    pub layout_name: String,
    pub viewport: Viewport,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub anomalies: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub source: PositionSource,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub animated: bool,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    /// Snapshot of the canvas; `resolved` supplies where each position came from.
    pub fn from_canvas(canvas: &Canvas, resolved: &ResolvedDiagram) -> Self {
        let sources: HashMap<&str, PositionSource> = resolved
            .nodes
            .iter()
            .map(|node| (node.node.id.as_str(), node.source))
            .collect();

        let nodes = canvas
            .nodes()
            .iter()
            .map(|node| NodeDump {
                id: node.node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                width: node.size.width,
                height: node.size.height,
                source: sources
                    .get(node.node.id.as_str())
                    .copied()
                    .unwrap_or(PositionSource::Static),
                label_lines: node.node.label_lines().into_iter().map(str::to_string).collect(),
            })
            .collect();

        let edges = canvas
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                from: edge.source.clone(),
                to: edge.target.clone(),
                kind: format!("{:?}", edge.kind),
                animated: edge.animated,
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
                points: edge_geometry(canvas, edge)
                    .map(|geometry| geometry.points.iter().map(|p| [p.x, p.y]).collect())
                    .unwrap_or_default(),
            })
            .collect();

        LayoutDump {
            diagram: canvas.diagram_id.clone(),
            layout_name: canvas.layout_name.clone(),
            viewport: canvas.viewport(),
            nodes,
            edges,
            anomalies: resolved.anomalies.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, canvas: &Canvas, resolved: &ResolvedDiagram) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_canvas(canvas, resolved);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
