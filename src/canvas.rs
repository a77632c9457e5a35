//! Headless diagram canvas: the resolved graph plus viewport state.
//!
//! The canvas owns the node and edge collections after resolution. Drags and
//! reconnections mutate them in place and are never persisted; the layout
//! exporter reads whatever state the canvas holds.
//!
//! Times are clock readings supplied by the host, as the `Duration` since an
//! origin of its choosing. The canvas never reads a clock itself.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ir::{CanvasOptions, Edge, Node, Position, Side, Size};
use crate::resolve::ResolvedDiagram;

pub const ZOOM_STEP: f32 = 1.2;
pub const MINIMAP_SIZE: Size = Size::new(200.0, 150.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Converts a screen point into flow coordinates.
    pub fn to_flow(&self, screen: Position) -> Position {
        Position::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn union(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitViewOptions {
    pub padding: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

#[derive(Debug, Clone)]
pub struct CanvasNode {
    pub node: Node,
    pub position: Position,
    pub size: Size,
}

impl CanvasNode {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.position.x,
            y: self.position.y,
            width: self.size.width,
            height: self.size.height,
        }
    }

    /// Attachment point of an edge on this node.
    pub fn anchor(&self, side: Side) -> Position {
        let rect = self.rect();
        match side {
            Side::Top => Position::new(rect.x + rect.width / 2.0, rect.y),
            Side::Right => Position::new(rect.x + rect.width, rect.y + rect.height / 2.0),
            Side::Bottom => Position::new(rect.x + rect.width / 2.0, rect.y + rect.height),
            Side::Left => Position::new(rect.x, rect.y + rect.height / 2.0),
        }
    }
}

/// New endpoints for an edge dragged onto other handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CanvasError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapNode<'a> {
    pub id: &'a str,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimap<'a> {
    /// Flow-space area covered by the minimap.
    pub bounds: Rect,
    pub scale: f32,
    pub offset: Position,
    pub nodes: Vec<MinimapNode<'a>>,
    /// Visible viewport area in minimap coordinates.
    pub view: Rect,
}

impl Minimap<'_> {
    pub fn to_flow(&self, point: Position) -> Position {
        Position::new(
            (point.x - self.offset.x) / self.scale + self.bounds.x,
            (point.y - self.offset.y) / self.scale + self.bounds.y,
        )
    }

    fn project(&self, rect: Rect) -> Rect {
        Rect {
            x: (rect.x - self.bounds.x) * self.scale + self.offset.x,
            y: (rect.y - self.bounds.y) * self.scale + self.offset.y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pub diagram_id: String,
    pub layout_name: String,
    nodes: Vec<CanvasNode>,
    edges: Vec<Edge>,
    viewport: Viewport,
    options: CanvasOptions,
    animation_start: Duration,
}

impl Canvas {
    pub fn new(resolved: ResolvedDiagram, options: CanvasOptions) -> Self {
        let nodes = resolved
            .nodes
            .into_iter()
            .map(|resolved| {
                let size = resolved.node.rendered_size();
                CanvasNode {
                    node: resolved.node,
                    position: resolved.position,
                    size,
                }
            })
            .collect();
        Self {
            diagram_id: resolved.diagram_id,
            layout_name: resolved.layout_name,
            nodes,
            edges: resolved.edges,
            viewport: Viewport::default(),
            options,
            animation_start: Duration::ZERO,
        }
    }

    /// Same canvas shown in a viewport of a different width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.options.width = width.max(1.0);
        self
    }

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.nodes.iter().find(|node| node.node.id == id)
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Handle for collaborators that drive the viewport.
    pub fn viewport_handle(&mut self) -> ViewportHandle<'_> {
        ViewportHandle { canvas: self }
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), CanvasError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.node.id == id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_string()))?;
        node.position = position;
        Ok(())
    }

    /// Moves a node by a screen-space delta, as a pointer drag does.
    pub fn drag_node(&mut self, id: &str, dx: f32, dy: f32) -> Result<Position, CanvasError> {
        let zoom = self.viewport.zoom;
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.node.id == id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_string()))?;
        node.position = Position::new(node.position.x + dx / zoom, node.position.y + dy / zoom);
        Ok(node.position)
    }

    pub fn reconnect_edge(&mut self, edge_id: &str, connection: Connection) -> Result<(), CanvasError> {
        for endpoint in [&connection.source, &connection.target] {
            if self.node(endpoint).is_none() {
                return Err(CanvasError::UnknownNode(endpoint.clone()));
            }
        }
        let edge = self
            .edges
            .iter_mut()
            .find(|edge| edge.id == edge_id)
            .ok_or_else(|| CanvasError::UnknownEdge(edge_id.to_string()))?;
        debug!(edge = edge_id; "Reconnecting edge {} -> {}", connection.source, connection.target);
        edge.source = connection.source;
        edge.target = connection.target;
        edge.source_handle = connection.source_handle;
        edge.target_handle = connection.target_handle;
        Ok(())
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.options.min_zoom, self.options.max_zoom)
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.viewport.x += dx;
        self.viewport.y += dy;
    }

    /// Zooms around a screen point, keeping that point fixed.
    pub fn zoom_by(&mut self, factor: f32, anchor: Position) {
        let zoom = self.clamp_zoom(self.viewport.zoom * factor);
        let flow = self.viewport.to_flow(anchor);
        self.viewport = Viewport {
            x: anchor.x - flow.x * zoom,
            y: anchor.y - flow.y * zoom,
            zoom,
        };
    }

    fn screen_center(&self) -> Position {
        Position::new(self.options.width / 2.0, self.options.height / 2.0)
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP, self.screen_center());
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP, self.screen_center());
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            zoom: self.clamp_zoom(viewport.zoom),
            ..viewport
        };
    }

    /// Bounding box of all nodes, `None` for an empty canvas.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(CanvasNode::rect)
            .reduce(Rect::union)
    }

    pub fn default_fit_options(&self) -> FitViewOptions {
        FitViewOptions {
            padding: self.options.fit_padding,
            min_zoom: self.options.min_zoom,
            max_zoom: self.options.max_zoom,
        }
    }

    /// Centers and scales the viewport so every node is visible.
    pub fn fit_view(&mut self, fit: FitViewOptions) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        let padded_w = (bounds.width * (1.0 + fit.padding)).max(1.0);
        let padded_h = (bounds.height * (1.0 + fit.padding)).max(1.0);
        let zoom = (self.options.width / padded_w)
            .min(self.options.height / padded_h)
            .clamp(fit.min_zoom, fit.max_zoom)
            .clamp(self.options.min_zoom, self.options.max_zoom);
        let center = bounds.center();
        self.viewport = Viewport {
            x: self.options.width / 2.0 - center.x * zoom,
            y: self.options.height / 2.0 - center.y * zoom,
            zoom,
        };
        debug!(
            "fit_view for {}: zoom {:.3}, offset ({:.1}, {:.1})",
            self.layout_name, zoom, self.viewport.x, self.viewport.y
        );
        true
    }

    /// Visible area in flow coordinates.
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.viewport.to_flow(Position::new(0.0, 0.0));
        Rect {
            x: top_left.x,
            y: top_left.y,
            width: self.options.width / self.viewport.zoom,
            height: self.options.height / self.viewport.zoom,
        }
    }

    pub fn minimap(&self) -> Option<Minimap<'_>> {
        if !self.options.minimap {
            return None;
        }
        let view = self.visible_rect();
        let bounds = self.bounds().map_or(view, |b| b.union(view));
        let scale = (MINIMAP_SIZE.width / bounds.width.max(1.0))
            .min(MINIMAP_SIZE.height / bounds.height.max(1.0));
        let offset = Position::new(
            (MINIMAP_SIZE.width - bounds.width * scale) / 2.0,
            (MINIMAP_SIZE.height - bounds.height * scale) / 2.0,
        );
        let mut minimap = Minimap {
            bounds,
            scale,
            offset,
            nodes: Vec::new(),
            view,
        };
        minimap.view = minimap.project(view);
        minimap.nodes = self
            .nodes
            .iter()
            .map(|node| MinimapNode {
                id: node.node.id.as_str(),
                rect: minimap.project(node.rect()),
            })
            .collect();
        Some(minimap)
    }

    /// Centres the viewport on the flow point under a minimap click.
    pub fn minimap_navigate(&mut self, point: Position) -> bool {
        let Some(target) = self.minimap().map(|minimap| minimap.to_flow(point)) else {
            return false;
        };
        let zoom = self.viewport.zoom;
        let center = self.screen_center();
        self.viewport.x = center.x - target.x * zoom;
        self.viewport.y = center.y - target.y * zoom;
        true
    }

    /// Time on the animation clock at the reading `now`.
    pub fn animation_elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.animation_start)
    }

    /// Endpoints of an edge, honouring explicit handles and node defaults.
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<(Position, Side, Position, Side)> {
        let source = self.node(&edge.source)?;
        let target = self.node(&edge.target)?;
        let source_side = edge
            .source_handle
            .as_deref()
            .and_then(Side::from_handle)
            .or(source.node.source_side)
            .unwrap_or(Side::Bottom);
        let target_side = edge
            .target_handle
            .as_deref()
            .and_then(Side::from_handle)
            .or(target.node.target_side)
            .unwrap_or(Side::Top);
        Some((
            source.anchor(source_side),
            source_side,
            target.anchor(target_side),
            target_side,
        ))
    }
}

/// Viewport access handed to collaborators such as the viewport controller
/// or an external capture harness.
pub struct ViewportHandle<'a> {
    canvas: &'a mut Canvas,
}

impl ViewportHandle<'_> {
    pub fn get_viewport(&self) -> Viewport {
        self.canvas.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.canvas.set_viewport(viewport);
    }

    /// Restarts the clock that phases animated edges.
    pub fn reset_animation_clock(&mut self, now: Duration) {
        self.canvas.animation_start = now;
    }

    pub fn fit_view(&mut self, fit: FitViewOptions) -> bool {
        self.canvas.fit_view(fit)
    }

    pub fn default_fit_options(&self) -> FitViewOptions {
        self.canvas.default_fit_options()
    }
}
