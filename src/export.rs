//! Developer tool that snapshots the live canvas as a saved layout document.

use std::io;
use std::path::PathBuf;

use log::info;

use crate::canvas::Canvas;
use crate::saved_layout::{EdgeLayoutEntry, LayoutDocument, NodeLayoutEntry, layout_path};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize layout {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write layout to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct LayoutExporter {
    /// Export only happens in development builds or with `--dev-tools`.
    pub enabled: bool,
    /// Where the exported file is written (the "download" location).
    pub output_dir: PathBuf,
    /// Where saved layouts are read from; named in the reminder.
    pub layouts_dir: PathBuf,
}

impl LayoutExporter {
    pub fn new(enabled: bool, output_dir: impl Into<PathBuf>, layouts_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            output_dir: output_dir.into(),
            layouts_dir: layouts_dir.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, ".", ".")
    }

    /// Current node positions and edge handles of the canvas.
    pub fn document(canvas: &Canvas) -> LayoutDocument {
        LayoutDocument {
            nodes: canvas
                .nodes()
                .iter()
                .map(|node| NodeLayoutEntry {
                    id: node.node.id.clone(),
                    position: node.position,
                })
                .collect(),
            edges: canvas
                .edges()
                .iter()
                .map(|edge| EdgeLayoutEntry {
                    id: edge.id.clone(),
                    source_handle: edge.source_handle.clone(),
                    target_handle: edge.target_handle.clone(),
                    data: edge.data.clone(),
                })
                .collect(),
        }
    }

    /// Writes `<output_dir>/<layout_name>.json`. Returns the written path, or
    /// `None` when the tool is disabled.
    pub fn export(&self, canvas: &Canvas, layout_name: &str) -> Result<Option<PathBuf>, ExportError> {
        if !self.enabled {
            return Ok(None);
        }
        let json = Self::document(canvas)
            .to_pretty_json()
            .map_err(|source| ExportError::Serialize {
                name: layout_name.to_string(),
                source,
            })?;
        let path = layout_path(&self.output_dir, layout_name);
        std::fs::write(&path, &json).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Layout JSON for {layout_name}:\n{json}");
        info!(
            "Save this to: {}",
            layout_path(&self.layouts_dir, layout_name).display()
        );
        Ok(Some(path))
    }
}
