use archview::layout::EngineKind;
use archview::saved_layout::{MemorySource, NoSource};
use archview::theme::Theme;
use archview::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewerRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    engine: Option<EngineKind>,
    show_grid: Option<bool>,
    show_minimap: Option<bool>,
}

fn build_render_options(options: ViewerRenderOptions) -> RenderOptions {
    let mut render_options = RenderOptions {
        theme: options
            .theme
            .as_deref()
            .and_then(Theme::by_name)
            .unwrap_or_default(),
        ..RenderOptions::default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(engine) = options.engine {
        render_options.engine = engine;
    }
    if let Some(show_grid) = options.show_grid {
        render_options.canvas.show_grid = show_grid;
    }
    if let Some(show_minimap) = options.show_minimap {
        render_options.canvas.show_minimap = show_minimap;
    }

    render_options
}

/// Renders a diagram tab. `saved_layout_json` is the tab's saved layout
/// document, if the host has one.
#[wasm_bindgen]
pub fn render_diagram_svg(
    tab: &str,
    saved_layout_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ViewerRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        ViewerRenderOptions::default()
    };
    let render_options = build_render_options(options);

    let rendered = match saved_layout_json {
        Some(document) => {
            let layout_name = archview::diagrams::find_or_default(tab).layout_name.as_str();
            let source = MemorySource::new().with(layout_name, document);
            render_with_options(tab, &source, &render_options)
        }
        None => render_with_options(tab, &NoSource, &render_options),
    };
    rendered.ok_or_else(|| JsValue::from_str("diagram activation was superseded"))
}

#[cfg(test)]
mod tests {
    use archview::render_with_options;
    use archview::saved_layout::MemorySource;

    use crate::{ViewerRenderOptions, build_render_options, render_diagram_svg};

    #[test]
    fn entry_point_renders_every_tab() {
        for tab in ["overview", "message-flow", "correlation", "kubernetes", "missing"] {
            let svg = render_diagram_svg(tab, None, None).expect("entry point renders");
            assert!(svg.starts_with("<svg"), "{tab}");
        }
        let saved = r#"{"nodes":[{"id":"ingress","position":{"x":3,"y":4}}]}"#;
        let options = r#"{"theme":"dark","engine":"ranked","showMinimap":false}"#;
        let svg = render_diagram_svg("kubernetes", Some(saved.to_string()), Some(options.to_string()))
            .expect("entry point renders");
        assert!(svg.contains("#111827"));
        assert!(!svg.contains("class=\"minimap\""));
    }

    #[test]
    fn renders_message_flow_with_saved_layout() {
        let source = MemorySource::new().with(
            "messageFlow",
            r#"{"nodes":[{"id":"seed","position":{"x":0,"y":0}}]}"#,
        );
        let options = build_render_options(ViewerRenderOptions {
            theme: Some("dark".to_string()),
            ..ViewerRenderOptions::default()
        });

        let svg = render_with_options("message-flow", &source, &options)
            .expect("message flow should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Seed Service"));
        assert!(svg.contains("#111827"));
    }
}
