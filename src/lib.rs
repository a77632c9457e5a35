pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagrams;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod resolve;
pub mod saved_layout;
pub mod shell;
pub mod theme;
pub mod viewport;

use std::time::Duration;

use crate::canvas::Canvas;
use crate::config::{CanvasConfig, Config};
use crate::layout::EngineKind;
use crate::resolve::{PositionResolver, ResolvedDiagram};
use crate::saved_layout::LayoutSource;
use crate::shell::Shell;
use crate::theme::Theme;

#[cfg(feature = "cli")]
pub use cli::{Args, run};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub canvas: CanvasConfig,
    pub engine: EngineKind,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: config.theme.clone(),
            canvas: config.canvas.clone(),
            engine: config.layout.engine,
        }
    }
}

/// A diagram as it looks once shown: positions resolved and view framed.
#[derive(Debug)]
pub struct PreparedDiagram {
    pub resolved: ResolvedDiagram,
    pub canvas: Canvas,
}

/// Activates `tab` (unknown ids show the overview), resolves positions and
/// runs the initial framing. The view is shown at clock reading zero, so the
/// canvas animation clock starts there.
pub fn prepare(tab: &str, source: &dyn LayoutSource, engine: EngineKind, fit_delay: Duration) -> Option<PreparedDiagram> {
    let engine = engine.engine();
    let resolver = PositionResolver::new(source, engine.as_ref());
    let mut shell = Shell::new(fit_delay);
    let now = Duration::ZERO;
    let activation = shell.activate(tab);
    let resolved = resolver.resolve(activation.diagram);
    if !shell.complete(activation, resolved.clone(), now) {
        return None;
    }
    shell.tick(now + shell.fit_delay());
    shell.into_view().map(|view| PreparedDiagram {
        resolved,
        canvas: view.canvas,
    })
}

/// Renders a diagram tab to SVG, as a still frame taken
/// `options.canvas.animation_time` seconds after the view was shown.
pub fn render_with_options(tab: &str, source: &dyn LayoutSource, options: &RenderOptions) -> Option<String> {
    let prepared = prepare(tab, source, options.engine, options.canvas.fit_delay())?;
    Some(render::render_svg(
        &prepared.canvas,
        &options.theme,
        &options.canvas,
        options.canvas.frame_time(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_layout::NoSource;

    #[test]
    fn prepared_diagram_is_framed() {
        let prepared = prepare("kubernetes", &NoSource, EngineKind::Ranked, Duration::from_millis(100))
            .expect("prepared");
        assert_eq!(prepared.canvas.layout_name, "kubernetesInfra");
        assert_ne!(prepared.canvas.viewport(), canvas::Viewport::default());
    }

    #[test]
    fn renders_every_tab() {
        for tab in diagrams::DIAGRAM_TABS {
            let svg = render_with_options(tab.id, &NoSource, &RenderOptions::default()).expect("svg");
            assert!(svg.contains("<svg"), "{}", tab.id);
        }
    }

    #[test]
    fn still_frames_are_phased_by_animation_time() {
        let mut options = RenderOptions::default();
        let first = render_with_options("correlation", &NoSource, &options).expect("svg");
        options.canvas.animation_time = 0.25;
        let later = render_with_options("correlation", &NoSource, &options).expect("svg");
        assert!(first.contains("stroke-dashoffset=\"0.00\""));
        assert!(later.contains("stroke-dashoffset=\"-5.00\""));
    }
}
