use crate::canvas::{Canvas, MINIMAP_SIZE, Rect};
use crate::config::{CanvasConfig, RenderConfig};
use crate::ir::{Edge, EdgeKind, LABEL_LINE_HEIGHT, Node, Position, Side};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

const SMOOTHSTEP_OFFSET: f32 = 20.0;
const BEZIER_CURVATURE: f32 = 0.25;
const MINIMAP_MARGIN: f32 = 15.0;
const CONTROLS_MARGIN: f32 = 15.0;
const CONTROL_SIZE: f32 = 26.0;
/// Dash phase advance of animated edges, in user units per second.
const DASH_SPEED: f32 = 20.0;
const DASH_PERIOD: f32 = 10.0;

/// Renders the canvas as it would appear on screen at clock reading `now`,
/// viewport included. Animated edges take their dash phase from the canvas
/// animation clock.
pub fn render_svg(canvas: &Canvas, theme: &Theme, config: &CanvasConfig, now: Duration) -> String {
    let options = canvas.options();
    let width = options.width;
    let height = options.height;
    let viewport = canvas.viewport();
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" data-diagram=\"{}\">",
        escape_xml(&canvas.layout_name)
    ));

    svg.push_str("<defs>");
    if config.show_grid {
        let gap = theme.grid_spacing * viewport.zoom;
        let radius = (0.5 * viewport.zoom).max(0.3);
        svg.push_str(&format!(
            "<pattern id=\"grid\" x=\"{:.2}\" y=\"{:.2}\" width=\"{gap:.2}\" height=\"{gap:.2}\" patternUnits=\"userSpaceOnUse\"><circle cx=\"{radius:.2}\" cy=\"{radius:.2}\" r=\"{radius:.2}\" fill=\"{}\"/></pattern>",
            viewport.x.rem_euclid(gap.max(f32::EPSILON)),
            viewport.y.rem_euclid(gap.max(f32::EPSILON)),
            escape_xml(&theme.grid_color)
        ));
    }
    for color in marker_colors(canvas.edges(), theme) {
        svg.push_str(&format!(
            "<marker id=\"{}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"12\" markerHeight=\"12\" markerUnits=\"userSpaceOnUse\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
            marker_id(&color),
            escape_xml(&color)
        ));
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));
    if config.show_grid {
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"url(#grid)\"/>");
    }

    svg.push_str(&format!(
        "<g class=\"viewport\" transform=\"translate({:.2} {:.2}) scale({:.4})\">",
        viewport.x, viewport.y, viewport.zoom
    ));

    let animation_time = canvas.animation_elapsed(now).as_secs_f32();
    let mut occupied: Vec<Rect> = Vec::new();
    let mut labels = String::new();
    for edge in canvas.edges() {
        let Some(geometry) = edge_geometry(canvas, edge) else {
            continue;
        };
        svg.push_str(&edge_svg(edge, &geometry.path, theme, animation_time));
        if let Some(label) = edge.label.as_deref() {
            labels.push_str(&edge_label_svg(label, &geometry.points, theme, &mut occupied));
        }
    }
    svg.push_str(&labels);

    for node in canvas.nodes() {
        svg.push_str(&node_svg(&node.node, node.rect(), theme));
    }
    svg.push_str("</g>");

    if config.show_controls {
        svg.push_str(&controls_svg(canvas, theme));
    }
    if config.show_minimap {
        svg.push_str(&minimap_svg(canvas, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn marker_colors(edges: &[Edge], theme: &Theme) -> BTreeSet<String> {
    edges
        .iter()
        .filter_map(|edge| edge.marker_end.as_ref())
        .map(|marker| {
            marker
                .color
                .clone()
                .unwrap_or_else(|| theme.default_marker_color.clone())
        })
        .collect()
}

fn marker_id(color: &str) -> String {
    let slug: String = color
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    format!("arrow-{}", slug.trim_matches('-'))
}

pub struct EdgeGeometry {
    /// Polyline through the route, used for label placement.
    pub points: Vec<Position>,
    /// SVG path data.
    pub path: String,
}

/// Route of an edge on the canvas, or `None` if an endpoint is missing.
pub fn edge_geometry(canvas: &Canvas, edge: &Edge) -> Option<EdgeGeometry> {
    let (source, source_side, target, target_side) = canvas.edge_endpoints(edge)?;
    let geometry = match edge.kind {
        EdgeKind::Straight => {
            let points = vec![source, target];
            let path = points_to_path(&points);
            EdgeGeometry { points, path }
        }
        EdgeKind::Bezier => EdgeGeometry {
            points: vec![source, target],
            path: bezier_path(source, source_side, target, target_side),
        },
        EdgeKind::SmoothStep => {
            let points = smoothstep_points(source, source_side, target, target_side);
            let path = points_to_path(&points);
            EdgeGeometry { points, path }
        }
    };
    Some(geometry)
}

fn side_direction(side: Side) -> (f32, f32) {
    match side {
        Side::Top => (0.0, -1.0),
        Side::Right => (1.0, 0.0),
        Side::Bottom => (0.0, 1.0),
        Side::Left => (-1.0, 0.0),
    }
}

fn step_out(point: Position, side: Side) -> Position {
    let (dx, dy) = side_direction(side);
    Position::new(point.x + dx * SMOOTHSTEP_OFFSET, point.y + dy * SMOOTHSTEP_OFFSET)
}

/// Orthogonal route leaving and entering perpendicular to the node sides.
fn smoothstep_points(source: Position, source_side: Side, target: Position, target_side: Side) -> Vec<Position> {
    let s = step_out(source, source_side);
    let t = step_out(target, target_side);
    let mut points = vec![source, s];
    match (source_side.is_vertical(), target_side.is_vertical()) {
        (true, true) => {
            let y = match (source_side, target_side) {
                (Side::Top, Side::Top) => s.y.min(t.y),
                (Side::Bottom, Side::Bottom) => s.y.max(t.y),
                _ => (s.y + t.y) / 2.0,
            };
            points.push(Position::new(s.x, y));
            points.push(Position::new(t.x, y));
        }
        (false, false) => {
            let x = match (source_side, target_side) {
                (Side::Left, Side::Left) => s.x.min(t.x),
                (Side::Right, Side::Right) => s.x.max(t.x),
                _ => (s.x + t.x) / 2.0,
            };
            points.push(Position::new(x, s.y));
            points.push(Position::new(x, t.y));
        }
        (true, false) => points.push(Position::new(s.x, t.y)),
        (false, true) => points.push(Position::new(t.x, s.y)),
    }
    points.push(t);
    points.push(target);
    points.dedup_by(|a, b| (a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01);
    points
}

fn control_offset(distance: f32) -> f32 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        BEZIER_CURVATURE * 25.0 * (-distance).sqrt()
    }
}

fn control_point(side: Side, from: Position, to: Position) -> Position {
    match side {
        Side::Left => Position::new(from.x - control_offset(from.x - to.x), from.y),
        Side::Right => Position::new(from.x + control_offset(to.x - from.x), from.y),
        Side::Top => Position::new(from.x, from.y - control_offset(from.y - to.y)),
        Side::Bottom => Position::new(from.x, from.y + control_offset(to.y - from.y)),
    }
}

fn points_to_path(points: &[Position]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}

fn bezier_path(source: Position, source_side: Side, target: Position, target_side: Side) -> String {
    let c1 = control_point(source_side, source, target);
    let c2 = control_point(target_side, target, source);
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        source.x, source.y, c1.x, c1.y, c2.x, c2.y, target.x, target.y
    )
}

/// Dash offset of an animated edge at `seconds` after the clock reset.
pub fn dash_offset(seconds: f32) -> f32 {
    let phase = (seconds * DASH_SPEED).rem_euclid(DASH_PERIOD);
    if phase == 0.0 { 0.0 } else { -phase }
}

fn edge_svg(edge: &Edge, d: &str, theme: &Theme, animation_time: f32) -> String {
    let mut attrs = format!(
        "stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&edge.style.stroke),
        edge.style.stroke_width
    );
    if edge.animated {
        attrs.push_str(&format!(
            " stroke-dasharray=\"5\" stroke-dashoffset=\"{:.2}\"",
            dash_offset(animation_time)
        ));
    } else if let Some(dash) = edge.style.dasharray.as_deref() {
        attrs.push_str(&format!(" stroke-dasharray=\"{}\"", escape_xml(dash)));
    }
    if let Some(marker) = edge.marker_end.as_ref() {
        let color = marker
            .color
            .as_deref()
            .unwrap_or(theme.default_marker_color.as_str());
        attrs.push_str(&format!(" marker-end=\"url(#{})\"", marker_id(color)));
    }
    let mut out = format!(
        "<path class=\"edge{}\" data-id=\"{}\" d=\"{d}\" fill=\"none\" {attrs}>",
        if edge.animated { " animated" } else { "" },
        escape_xml(&edge.id)
    );
    if edge.animated {
        let start = dash_offset(animation_time);
        out.push_str(&format!(
            "<animate attributeName=\"stroke-dashoffset\" from=\"{start:.2}\" to=\"{:.2}\" dur=\"{:.2}s\" repeatCount=\"indefinite\"/>",
            start - DASH_PERIOD,
            DASH_PERIOD / DASH_SPEED
        ));
    }
    out.push_str("</path>");
    out
}

/// Rough advance width; wide glyphs such as emoji count as a full em.
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|ch| if ch.is_ascii() { 0.6_f32 } else { 1.0 })
        .sum::<f32>()
        * font_size
}

fn path_midpoint(points: &[Position]) -> Position {
    match points {
        [] => Position::default(),
        [only] => *only,
        _ if points.len() >= 4 => {
            let mid = points.len() / 2;
            let (a, b) = (points[mid - 1], points[mid]);
            Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
        }
        _ => {
            let (a, b) = (points[0], points[points.len() - 1]);
            Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
        }
    }
}

fn collides(rect: &Rect, occupied: &[Rect]) -> bool {
    occupied.iter().any(|other| {
        rect.x < other.x + other.width
            && rect.x + rect.width > other.x
            && rect.y < other.y + other.height
            && rect.y + rect.height > other.y
    })
}

/// Places the label at the path midpoint, nudging it down while it overlaps
/// an earlier label.
fn edge_label_svg(label: &str, points: &[Position], theme: &Theme, occupied: &mut Vec<Rect>) -> String {
    let font_size = theme.edge_label_font_size;
    let width = text_width(label, font_size);
    let height = font_size * LABEL_LINE_HEIGHT;
    let mid = path_midpoint(points);
    let mut center = mid;
    let mut rect = label_rect(center, width, height);
    for _ in 0..6 {
        if !collides(&rect, occupied) {
            break;
        }
        center.y += height + 6.0;
        rect = label_rect(center, width, height);
    }
    if collides(&rect, occupied) {
        center = mid;
        rect = label_rect(center, width, height);
    }
    occupied.push(rect);
    format!(
        "<g class=\"edge-label\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" ry=\"2\" fill=\"{}\"/><text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(&theme.edge_label_background),
        center.x,
        center.y,
        escape_xml(&theme.font_family),
        font_size,
        escape_xml(&theme.edge_label_color),
        escape_xml(label)
    )
}

fn label_rect(center: Position, width: f32, height: f32) -> Rect {
    Rect {
        x: center.x - width / 2.0 - 4.0,
        y: center.y - height / 2.0 - 2.0,
        width: width + 8.0,
        height: height + 4.0,
    }
}

fn node_svg(node: &Node, rect: Rect, theme: &Theme) -> String {
    let style = &node.style;
    let font_family = style
        .font_family
        .as_deref()
        .map(|family| {
            if family == "monospace" {
                theme.monospace_font_family.as_str()
            } else {
                family
            }
        })
        .unwrap_or(theme.font_family.as_str());
    let mut out = format!(
        "<g class=\"node\" data-id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" ry=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        escape_xml(&node.id),
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        style.border_radius,
        style.border_radius,
        escape_xml(&style.background),
        escape_xml(&theme.node_border_color)
    );

    let lines = node.label_lines();
    let line_height = style.font_size * LABEL_LINE_HEIGHT;
    let center = rect.center();
    let start_y = center.y - line_height * lines.len() as f32 / 2.0 + line_height / 2.0;
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\"{} fill=\"{}\">",
        center.x,
        escape_xml(font_family),
        style.font_size,
        if style.bold { " font-weight=\"bold\"" } else { "" },
        escape_xml(&style.color)
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            "<tspan x=\"{:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            center.x,
            escape_xml(line)
        ));
    }
    out.push_str("</text></g>");
    out
}

fn minimap_svg(canvas: &Canvas, theme: &Theme) -> String {
    let Some(minimap) = canvas.minimap() else {
        return String::new();
    };
    let options = canvas.options();
    let origin_x = options.width - MINIMAP_SIZE.width - MINIMAP_MARGIN;
    let origin_y = options.height - MINIMAP_SIZE.height - MINIMAP_MARGIN;
    let mut out = format!(
        "<g class=\"minimap\" transform=\"translate({origin_x:.2} {origin_y:.2})\"><rect width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\"/>",
        MINIMAP_SIZE.width,
        MINIMAP_SIZE.height,
        escape_xml(&theme.minimap_background),
        escape_xml(&theme.minimap_border_color)
    );
    for node in &minimap.nodes {
        let fill = canvas
            .node(node.id)
            .map_or(theme.minimap_node_color.as_str(), |n| n.node.style.background.as_str());
        out.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"{}\"/>",
            node.rect.x,
            node.rect.y,
            node.rect.width,
            node.rect.height,
            escape_xml(fill)
        ));
    }
    let view = minimap.view;
    out.push_str(&format!(
        "<path class=\"minimap-mask\" d=\"M 0 0 h {w} v {h} h -{w} z M {:.2} {:.2} h {:.2} v {:.2} h {:.2} z\" fill=\"{}\" fill-rule=\"evenodd\"/>",
        view.x,
        view.y,
        view.width,
        view.height,
        -view.width,
        escape_xml(&theme.minimap_mask_color),
        w = MINIMAP_SIZE.width,
        h = MINIMAP_SIZE.height
    ));
    out.push_str("</g>");
    out
}

/// Zoom in, zoom out and fit view buttons stacked in the bottom-left corner.
/// A zoom button at its bound is drawn disabled.
fn controls_svg(canvas: &Canvas, theme: &Theme) -> String {
    let options = canvas.options();
    let zoom = canvas.viewport().zoom;
    let origin_y = options.height - CONTROLS_MARGIN - CONTROL_SIZE * 3.0;
    let buttons = [
        ("zoom-in", "M 8 13 h 10 M 13 8 v 10", zoom >= options.max_zoom),
        ("zoom-out", "M 8 13 h 10", zoom <= options.min_zoom),
        ("fit-view", "M 7 10 v -3 h 3 M 16 7 h 3 v 3 M 19 16 v 3 h -3 M 10 19 h -3 v -3", false),
    ];
    let mut out = format!(
        "<g class=\"controls\" transform=\"translate({CONTROLS_MARGIN:.2} {origin_y:.2})\">"
    );
    for (idx, (name, icon, disabled)) in buttons.iter().enumerate() {
        let y = idx as f32 * CONTROL_SIZE;
        out.push_str(&format!(
            "<g class=\"control {name}{}\" transform=\"translate(0 {y:.2})\"><rect width=\"{CONTROL_SIZE}\" height=\"{CONTROL_SIZE}\" fill=\"{}\" stroke=\"{}\"/><path d=\"{icon}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-opacity=\"{}\"/></g>",
            if *disabled { " disabled" } else { "" },
            escape_xml(&theme.minimap_background),
            escape_xml(&theme.minimap_border_color),
            escape_xml(&theme.edge_label_color),
            if *disabled { "0.4" } else { "1" }
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .map(|family| family.trim().trim_matches('"'))
        .find(|family| !family.starts_with('-'))
        .unwrap_or("sans-serif")
        .to_string();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let scale = render_cfg.scale;
    let width = ((size.width() as f32) * scale).ceil().max(1.0) as u32;
    let height = ((size.height() as f32) * scale).ceil().max(1.0) as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate {width}x{height} pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagrams;
    use crate::layout::RankedEngine;
    use crate::resolve::PositionResolver;
    use crate::saved_layout::NoSource;

    fn framed(tab: &str) -> Canvas {
        let diagram = diagrams::find(tab).expect("diagram");
        let resolved = PositionResolver::new(&NoSource, &RankedEngine).resolve(diagram);
        let mut canvas = Canvas::new(resolved, diagram.canvas);
        canvas.fit_view(canvas.default_fit_options());
        canvas
    }

    #[test]
    fn render_svg_basic() {
        let canvas = framed("overview");
        let svg = render_svg(&canvas, &Theme::light(), &CanvasConfig::default(), Duration::ZERO);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"edge").count() - svg.matches("class=\"edge-label").count(), 12);
        assert_eq!(svg.matches("class=\"node\"").count(), 8);
        assert!(svg.contains("Forecast"));
        assert!(svg.contains("url(#grid)"));
        assert!(!svg.contains("class=\"minimap\""));
    }

    #[test]
    fn minimap_rendered_when_enabled() {
        let canvas = framed("kubernetes");
        let svg = render_svg(&canvas, &Theme::light(), &CanvasConfig::default(), Duration::ZERO);
        assert!(svg.contains("class=\"minimap\""));
        let hidden = CanvasConfig {
            show_minimap: false,
            ..CanvasConfig::default()
        };
        assert!(!render_svg(&canvas, &Theme::light(), &hidden, Duration::ZERO).contains("class=\"minimap\""));
    }

    #[test]
    fn markers_are_emitted_per_colour() {
        let canvas = framed("overview");
        let svg = render_svg(&canvas, &Theme::light(), &CanvasConfig::default(), Duration::ZERO);
        assert!(svg.contains("<marker id=\"arrow-3b82f6\""));
        assert!(svg.contains("marker-end=\"url(#arrow-3b82f6)\""));
    }

    #[test]
    fn animated_edges_follow_the_clock() {
        assert_eq!(dash_offset(0.0), 0.0);
        assert!((dash_offset(0.25) + 5.0).abs() < 1e-4);
        let mut canvas = framed("correlation");
        let config = CanvasConfig::default();
        let quarter = Duration::from_millis(250);
        let early = render_svg(&canvas, &Theme::light(), &config, Duration::ZERO);
        let later = render_svg(&canvas, &Theme::light(), &config, quarter);
        assert!(early.contains("stroke-dashoffset=\"0.00\""));
        assert!(later.contains("stroke-dashoffset=\"-5.00\""));

        canvas.viewport_handle().reset_animation_clock(quarter);
        let restarted = render_svg(&canvas, &Theme::light(), &config, quarter);
        assert!(restarted.contains("stroke-dashoffset=\"0.00\""));
        assert!(!restarted.contains("stroke-dashoffset=\"-5.00\""));
    }

    #[test]
    fn controls_reflect_zoom_bounds() {
        let mut canvas = framed("overview");
        let config = CanvasConfig::default();
        let svg = render_svg(&canvas, &Theme::light(), &config, Duration::ZERO);
        assert!(svg.contains("class=\"controls\""));
        assert!(svg.contains("class=\"control fit-view\""));
        assert!(!svg.contains("control zoom-in disabled"));
        assert!(!svg.contains("control zoom-out disabled"));

        for _ in 0..40 {
            canvas.zoom_in();
        }
        let zoomed = render_svg(&canvas, &Theme::light(), &config, Duration::ZERO);
        assert!(zoomed.contains("class=\"control zoom-in disabled\""));
        assert!(zoomed.contains("class=\"control zoom-out\""));

        let hidden = CanvasConfig {
            show_controls: false,
            ..CanvasConfig::default()
        };
        assert!(!render_svg(&canvas, &Theme::light(), &hidden, Duration::ZERO).contains("class=\"controls\""));
    }

    #[test]
    fn theme_colours_are_escaped() {
        let canvas = framed("kubernetes");
        let mut theme = Theme::light();
        theme.background = "red\" onload=\"x".to_string();
        theme.grid_color = "<grid>".to_string();
        theme.node_border_color = "a&b".to_string();
        theme.minimap_background = "\"".to_string();
        theme.edge_label_background = "'".to_string();
        let svg = render_svg(&canvas, &theme, &CanvasConfig::default(), Duration::ZERO);
        assert!(!svg.contains("onload=\"x"));
        assert!(svg.contains("fill=\"red&quot; onload=&quot;x\""));
        assert!(svg.contains("fill=\"&lt;grid&gt;\""));
        assert!(svg.contains("stroke=\"a&amp;b\""));
        assert!(svg.contains("fill=\"&quot;\""));
    }

    #[test]
    fn smoothstep_routes_are_orthogonal() {
        let points = smoothstep_points(
            Position::new(0.0, 0.0),
            Side::Bottom,
            Position::new(100.0, 200.0),
            Side::Top,
        );
        assert_eq!(points.first(), Some(&Position::new(0.0, 0.0)));
        assert_eq!(points.last(), Some(&Position::new(100.0, 200.0)));
        for pair in points.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
        }
    }

    #[test]
    fn right_handles_route_around_the_right() {
        let points = smoothstep_points(
            Position::new(100.0, 0.0),
            Side::Right,
            Position::new(150.0, 300.0),
            Side::Right,
        );
        let rightmost = points.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert_eq!(rightmost, 170.0);
    }

    #[test]
    fn escapes_labels() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
