use crate::layout::EngineKind;
use crate::theme::Theme;
use crate::viewport::DEFAULT_FIT_DELAY;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub engine: EngineKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub fit_delay_ms: u64,
    pub show_grid: bool,
    pub show_minimap: bool,
    pub show_controls: bool,
    /// Clock reading of still frames, in seconds after the view was shown.
    pub animation_time: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            fit_delay_ms: DEFAULT_FIT_DELAY.as_millis() as u64,
            show_grid: true,
            show_minimap: true,
            show_controls: true,
            animation_time: 0.0,
        }
    }
}

impl CanvasConfig {
    pub fn fit_delay(&self) -> Duration {
        Duration::from_millis(self.fit_delay_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f32(self.animation_time.max(0.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Canvas width; the height comes from each diagram.
    pub width: f32,
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub canvas: CanvasConfig,
    pub render: RenderConfig,
    pub layouts_dir: PathBuf,
    pub dev_tools: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            layout: LayoutConfig::default(),
            canvas: CanvasConfig::default(),
            render: RenderConfig::default(),
            layouts_dir: PathBuf::from("layouts"),
            dev_tools: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    grid_color: Option<String>,
    edge_label_background: Option<String>,
    edge_label_color: Option<String>,
    minimap_background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutConfigFile {
    engine: Option<EngineKind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    fit_delay_ms: Option<u64>,
    show_grid: Option<bool>,
    show_minimap: Option<bool>,
    show_controls: Option<bool>,
    animation_time: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    scale: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    canvas: Option<CanvasConfigFile>,
    render: Option<RenderConfigFile>,
    layouts_dir: Option<PathBuf>,
    dev_tools: Option<bool>,
}

/// Reads a JSON or JSON5 config file and merges it over the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = json5::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    apply_config_file(config, parsed)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Result<Config, ConfigError> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme =
            Theme::by_name(theme_name).ok_or_else(|| ConfigError::UnknownTheme(theme_name.to_string()))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            config.theme.edge_label_background = v;
        }
        if let Some(v) = vars.edge_label_color {
            config.theme.edge_label_color = v;
        }
        if let Some(v) = vars.minimap_background {
            config.theme.minimap_background = v;
        }
    }

    if let Some(engine) = parsed.layout.and_then(|layout| layout.engine) {
        config.layout.engine = engine;
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.fit_delay_ms {
            config.canvas.fit_delay_ms = v;
        }
        if let Some(v) = canvas.show_grid {
            config.canvas.show_grid = v;
        }
        if let Some(v) = canvas.show_minimap {
            config.canvas.show_minimap = v;
        }
        if let Some(v) = canvas.show_controls {
            config.canvas.show_controls = v;
        }
        if let Some(v) = canvas.animation_time {
            config.canvas.animation_time = v.max(0.0);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.scale {
            config.render.scale = v.max(0.1);
        }
    }

    if let Some(dir) = parsed.layouts_dir {
        config.layouts_dir = dir;
    }
    if let Some(v) = parsed.dev_tools {
        config.dev_tools = v;
    }
    Ok(config)
}
