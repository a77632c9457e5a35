use archview::canvas::Canvas;
use archview::config::CanvasConfig;
use archview::diagrams;
use archview::ir::{LayoutOptions, Size};
use archview::layout::{DagreEngine, LayoutEdge, LayoutEngine, LayoutInput, LayoutNode, RankedEngine};
use archview::render::render_svg;
use archview::resolve::PositionResolver;
use archview::saved_layout::{NoSource, parse_override};
use archview::theme::Theme;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn dense_graph(nodes: usize, extra_edges: usize) -> LayoutInput {
    let mut input = LayoutInput::default();
    for i in 0..nodes {
        input.nodes.push(LayoutNode {
            id: format!("N{i}"),
            size: Size::new(200.0, 100.0),
        });
    }
    let mut push = |from: usize, to: usize| {
        input.edges.push(LayoutEdge {
            source: format!("N{from}"),
            target: format!("N{to}"),
        });
    };
    for i in 0..nodes.saturating_sub(1) {
        push(i, i + 1);
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            push(i, j);
            count += 1;
        }
    }
    input
}

fn saved_layout_document(nodes: usize) -> String {
    let entries: Vec<String> = (0..nodes)
        .map(|i| format!(r#"{{"id":"N{i}","position":{{"x":{},"y":{}}}}}"#, i * 10, i * 7))
        .collect();
    format!(r#"{{"nodes":[{}],"edges":[]}}"#, entries.join(","))
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let options = LayoutOptions::default();
    let engines: [(&str, &dyn LayoutEngine); 2] = [("dagre", &DagreEngine), ("ranked", &RankedEngine)];
    for (nodes, extra) in [(10usize, 10usize), (50, 80), (150, 300)] {
        let input = dense_graph(nodes, extra);
        for (name, engine) in engines {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{nodes}n_{extra}e")),
                &input,
                |b, data| b.iter(|| engine.compute(black_box(data), &options)),
            );
        }
    }
    group.finish();
}

fn bench_saved_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("saved_layout");
    for nodes in [10usize, 200, 2000] {
        let document = saved_layout_document(nodes);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &document, |b, data| {
            b.iter(|| parse_override("bench", black_box(data)))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let theme = Theme::light();
    let config = CanvasConfig::default();
    for diagram in diagrams::catalog() {
        let resolved = PositionResolver::new(&NoSource, &RankedEngine).resolve(diagram);
        let mut canvas = Canvas::new(resolved, diagram.canvas);
        canvas.fit_view(canvas.default_fit_options());
        group.bench_with_input(BenchmarkId::from_parameter(&diagram.layout_name), &canvas, |b, data| {
            b.iter(|| render_svg(black_box(data), &theme, &config, config.frame_time()))
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let options = archview::RenderOptions::default();
    for tab in diagrams::DIAGRAM_TABS {
        group.bench_function(tab.id, |b| {
            b.iter(|| archview::render_with_options(black_box(tab.id), &NoSource, &options))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_layout,
    bench_saved_layout,
    bench_render,
    bench_end_to_end
);
criterion_main!(benches);
