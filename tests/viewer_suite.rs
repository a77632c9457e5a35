use std::path::Path;
use std::thread;
use std::time::Duration;

use archview::config::CanvasConfig;
use archview::diagrams::{self, DIAGRAM_TABS};
use archview::export::LayoutExporter;
use archview::ir::Position;
use archview::layout::{EngineKind, RankedEngine};
use archview::render::render_svg;
use archview::resolve::{PositionResolver, PositionSource};
use archview::saved_layout::{DirectorySource, NoSource};
use archview::shell::Shell;
use archview::theme::Theme;
use archview::{RenderOptions, prepare, render_with_options};

const DELAY: Duration = Duration::from_millis(100);

fn assert_valid_svg(svg: &str, tab: &str) {
    assert!(svg.contains("<svg"), "{tab}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{tab}: missing </svg tag");
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(format!("{name}.json")), contents).expect("write saved layout");
}

#[test]
fn renders_every_tab_with_both_engines() {
    for engine in [EngineKind::Dagre, EngineKind::Ranked] {
        let options = RenderOptions {
            engine,
            ..RenderOptions::default()
        };
        for tab in DIAGRAM_TABS {
            let svg = render_with_options(tab.id, &NoSource, &options).expect("rendered");
            assert_valid_svg(&svg, tab.id);
        }
    }
}

#[test]
fn saved_layouts_on_disk_override_positions() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "messageFlow",
        r#"{"nodes":[{"id":"seed","position":{"x":-40,"y":12.5}}],"edges":[]}"#,
    );
    write(
        dir.path(),
        "kubernetesInfra",
        r#"[{"id":"ingress","position":{"x":7,"y":8}}]"#,
    );
    write(dir.path(), "systemOverview", "{ this is not json");
    let source = DirectorySource::new(dir.path());

    let flow = prepare("message-flow", &source, EngineKind::Ranked, DELAY).expect("prepared");
    assert_eq!(flow.resolved.position("seed"), Some(Position::new(-40.0, 12.5)));
    let auto_nodes = flow
        .resolved
        .nodes
        .iter()
        .filter(|node| node.source == PositionSource::Auto)
        .count();
    assert_eq!(auto_nodes, flow.resolved.nodes.len() - 1);

    let infra = prepare("kubernetes", &source, EngineKind::Ranked, DELAY).expect("prepared");
    assert_eq!(infra.resolved.position("ingress"), Some(Position::new(7.0, 8.0)));

    let broken = prepare("overview", &source, EngineKind::Ranked, DELAY).expect("prepared");
    let absent = prepare("overview", &NoSource, EngineKind::Ranked, DELAY).expect("prepared");
    assert_eq!(broken.resolved.positions(), absent.resolved.positions());
}

#[test]
fn exported_layout_is_picked_up_on_next_activation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut first = prepare("overview", &NoSource, EngineKind::Ranked, DELAY).expect("prepared");
    first.canvas.drag_node("zephyr", 30.0, 60.0).expect("drag");
    let dragged = first.canvas.nodes().to_vec();

    let exporter = LayoutExporter::new(true, dir.path(), dir.path());
    let path = exporter
        .export(&first.canvas, "systemOverview")
        .expect("export")
        .expect("enabled");
    assert!(path.ends_with("systemOverview.json"));

    let source = DirectorySource::new(dir.path());
    let second = prepare("overview", &source, EngineKind::Dagre, DELAY).expect("prepared");
    for node in dragged {
        assert_eq!(second.resolved.position(&node.node.id), Some(node.position));
    }
    assert!(
        second
            .resolved
            .nodes
            .iter()
            .all(|node| node.source == PositionSource::Override)
    );
}

#[test]
fn slow_resolution_for_an_old_tab_is_discarded() {
    let mut shell = Shell::new(DELAY);
    let first = shell.activate("kubernetes");
    let second = shell.activate("correlation");

    let slow = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        PositionResolver::new(&NoSource, &RankedEngine).resolve(first.diagram)
    });
    let fast = thread::spawn(move || PositionResolver::new(&NoSource, &RankedEngine).resolve(second.diagram));

    let now = Duration::from_secs(2);
    let fast = fast.join().expect("fast resolution");
    assert!(shell.complete(second, fast, now));
    let slow = slow.join().expect("slow resolution");
    assert!(!shell.complete(first, slow, now));

    assert_eq!(shell.view().expect("view").tab, "correlation");
    assert!(shell.tick(now + DELAY));
}

#[test]
fn unknown_tab_renders_overview() {
    let prepared = prepare("does-not-exist", &NoSource, EngineKind::Ranked, DELAY).expect("prepared");
    assert_eq!(prepared.canvas.layout_name, "systemOverview");
    let svg = render_svg(&prepared.canvas, &Theme::light(), &CanvasConfig::default(), Duration::ZERO);
    assert!(svg.contains("data-diagram=\"systemOverview\""));
    assert_eq!(diagrams::find_or_default("does-not-exist").id, "overview");
}
