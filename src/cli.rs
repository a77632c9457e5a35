//! Command-line front end: list, render, export and dump the diagrams.

use crate::canvas::Canvas;
use crate::config::{Config, load_config};
use crate::diagrams::{self, DIAGRAM_TABS};
use crate::export::LayoutExporter;
use crate::ir::Position;
use crate::layout::EngineKind;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::saved_layout::DirectorySource;
use crate::{PreparedDiagram, prepare};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Architecture diagram viewer
#[derive(Parser, Debug)]
#[command(name = "archview", author, version, about, long_about = None)]
pub struct Args {
    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding saved layouts (<layoutName>.json)
    #[arg(long = "layouts", global = true)]
    pub layouts: Option<PathBuf>,

    /// Layout engine used for diagrams without a complete saved layout
    #[arg(long = "engine", value_enum, global = true)]
    pub engine: Option<EngineKind>,

    /// Enable developer tools such as layout export
    #[arg(long = "dev-tools", global = true)]
    pub dev_tools: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the diagram tabs
    List,
    /// Render a diagram tab (or `all`) to SVG or PNG
    Render {
        /// Tab id, or `all`
        #[arg(default_value = diagrams::DEFAULT_TAB)]
        tab: String,

        /// Output file, or directory when rendering `all`. SVG goes to
        /// stdout if omitted.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
        output_format: OutputFormat,

        /// Canvas width
        #[arg(short = 'w', long = "width")]
        width: Option<f32>,
    },
    /// Write the current layout of a tab as a saved-layout document
    Export {
        tab: String,

        /// Directory the document is written to
        #[arg(long = "out-dir", default_value = ".")]
        out_dir: PathBuf,

        /// Move a node before exporting, as `id=x,y`; repeatable
        #[arg(long = "move", value_name = "ID=X,Y")]
        moves: Vec<String>,
    },
    /// Dump the resolved canvas of a tab as JSON
    Dump {
        tab: String,

        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run(args: &Args) -> Result<()> {
    let config = effective_config(args)?;
    match &args.command {
        Command::List => {
            for tab in DIAGRAM_TABS {
                let layout_name = diagrams::find(tab.id).map_or("", |d| d.layout_name.as_str());
                println!("{:<14} {:<16} {} ({})", tab.id, layout_name, tab.name, tab.description);
            }
            Ok(())
        }
        Command::Render {
            tab,
            output,
            output_format,
            width,
        } => {
            let mut config = config;
            if let Some(width) = width {
                config.render.width = *width;
            }
            if tab == "all" {
                let tabs: Vec<&str> = DIAGRAM_TABS.iter().map(|tab| tab.id).collect();
                let outputs = resolve_multi_outputs(output.as_deref(), *output_format, &tabs)?;
                for (tab, output) in tabs.iter().zip(outputs) {
                    render_tab(&config, tab, Some(&output), *output_format)?;
                }
                Ok(())
            } else {
                render_tab(&config, tab, output.as_deref(), *output_format)
            }
        }
        Command::Export { tab, out_dir, moves } => {
            let mut prepared = prepare_tab(&config, tab)?;
            for arg in moves {
                let (id, position) = parse_move(arg)?;
                prepared
                    .canvas
                    .move_node(&id, position)
                    .with_context(|| format!("cannot move `{id}`"))?;
            }
            let exporter = LayoutExporter::new(config.dev_tools, out_dir, &config.layouts_dir);
            let layout_name = prepared.canvas.layout_name.clone();
            match exporter.export(&prepared.canvas, &layout_name)? {
                Some(path) => println!("{}", path.display()),
                None => warn!("Layout export is a developer tool; pass --dev-tools to enable it"),
            }
            Ok(())
        }
        Command::Dump { tab, output } => {
            let prepared = prepare_tab(&config, tab)?;
            write_layout_dump(output, &prepared.canvas, &prepared.resolved)?;
            info!("Wrote layout dump to {}", output.display());
            Ok(())
        }
    }
}

fn effective_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = &args.layouts {
        config.layouts_dir = dir.clone();
    }
    if let Some(engine) = args.engine {
        config.layout.engine = engine;
    }
    if args.dev_tools {
        config.dev_tools = true;
    }
    Ok(config)
}

fn prepare_tab(config: &Config, tab: &str) -> Result<PreparedDiagram> {
    let source = DirectorySource::new(&config.layouts_dir);
    let mut prepared = prepare(tab, &source, config.layout.engine, config.canvas.fit_delay())
        .ok_or_else(|| anyhow::anyhow!("Activation of `{tab}` was superseded"))?;
    if (prepared.canvas.options().width - config.render.width).abs() > f32::EPSILON {
        prepared.canvas = resized(prepared.canvas, config.render.width);
    }
    Ok(prepared)
}

fn resized(canvas: Canvas, width: f32) -> Canvas {
    let mut canvas = canvas.with_width(width);
    canvas.fit_view(canvas.default_fit_options());
    canvas
}

fn render_tab(config: &Config, tab: &str, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    let prepared = prepare_tab(config, tab)?;
    let svg = render_svg(
        &prepared.canvas,
        &config.theme,
        &config.canvas,
        config.canvas.frame_time(),
    );
    match format {
        OutputFormat::Svg => write_output_svg(&svg, output),
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_output_png(&svg, output, &config.render, &config.theme)
        }
    }
}

fn parse_move(arg: &str) -> Result<(String, Position)> {
    let (id, coords) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected ID=X,Y, got `{arg}`"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Expected ID=X,Y, got `{arg}`"))?;
    let x: f32 = x.trim().parse().with_context(|| format!("Invalid x in `{arg}`"))?;
    let y: f32 = y.trim().parse().with_context(|| format!("Invalid y in `{arg}`"))?;
    Ok((id.trim().to_string(), Position::new(x, y)))
}

/// Output paths for `render all`: one file per tab, named by layout name.
fn resolve_multi_outputs(output: Option<&Path>, format: OutputFormat, tabs: &[&str]) -> Result<Vec<PathBuf>> {
    let ext = match format {
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
    };
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required when rendering all tabs"))?;
    let names: Vec<&str> = tabs
        .iter()
        .map(|tab| diagrams::find_or_default(tab).layout_name.as_str())
        .collect();
    if base.is_dir() {
        return Ok(names
            .iter()
            .map(|name| base.join(format!("{name}.{ext}")))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok(names
        .iter()
        .map(|name| parent.join(format!("{stem}-{name}.{ext}")))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_move_arguments() {
        let (id, position) = parse_move("forecast=10,-20.5").expect("parses");
        assert_eq!(id, "forecast");
        assert_eq!(position, Position::new(10.0, -20.5));
        assert!(parse_move("forecast").is_err());
        assert!(parse_move("forecast=1").is_err());
        assert!(parse_move("forecast=a,b").is_err());
    }

    #[test]
    fn multi_outputs_use_layout_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outputs =
            resolve_multi_outputs(Some(dir.path()), OutputFormat::Svg, &["overview", "kubernetes"]).expect("outputs");
        assert_eq!(
            outputs,
            vec![
                dir.path().join("systemOverview.svg"),
                dir.path().join("kubernetesInfra.svg")
            ]
        );
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/arch.png")), OutputFormat::Png, &["message-flow"]).expect("outputs");
        assert_eq!(outputs, vec![PathBuf::from("out/arch-messageFlow.png")]);
        assert!(resolve_multi_outputs(None, OutputFormat::Svg, &["overview"]).is_err());
    }

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from([
            "archview",
            "--dev-tools",
            "export",
            "message-flow",
            "--move",
            "seed=1,2",
        ])
        .expect("parses");
        assert!(args.dev_tools);
        assert_eq!(args.engine, None);
        match args.command {
            Command::Export { tab, moves, .. } => {
                assert_eq!(tab, "message-flow");
                assert_eq!(moves, vec!["seed=1,2".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn engine_flag_selects_layout_engine() {
        let args = Args::try_parse_from(["archview", "--engine", "ranked", "list"]).expect("parses");
        assert_eq!(args.engine, Some(EngineKind::Ranked));
        assert_eq!(effective_config(&args).expect("config").layout.engine, EngineKind::Ranked);
        assert!(Args::try_parse_from(["archview", "--engine", "elk", "list"]).is_err());
    }

    #[test]
    fn export_writes_document_with_dev_tools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "archview",
            "--dev-tools",
            "--engine",
            "ranked",
            "--layouts",
            out.as_str(),
            "export",
            "overview",
            "--out-dir",
            out.as_str(),
            "--move",
            "forecast=1,2",
        ])
        .expect("parses");
        run(&args).expect("export runs");
        let contents = std::fs::read_to_string(dir.path().join("systemOverview.json")).expect("written");
        assert!(contents.contains("\"id\": \"forecast\""));
    }
}
