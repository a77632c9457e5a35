//! Saved layouts: the override document format and the loader that turns a
//! stored document into a node position mapping.
//!
//! A missing or unreadable document is the normal case. Every failure while
//! loading collapses into `None` so callers fall back to automatic layout.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ir::Position;

pub type PositionMap = BTreeMap<String, Position>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayoutEntry {
    pub id: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLayoutEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Current on-disk format produced by the layout exporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub nodes: Vec<NodeLayoutEntry>,
    #[serde(default)]
    pub edges: Vec<EdgeLayoutEntry>,
}

impl LayoutDocument {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no saved layout named {0}")]
    NotFound(String),
    #[error("failed to read saved layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where saved layouts are retrieved from.
pub trait LayoutSource {
    fn fetch(&self, layout_name: &str) -> Result<String, SourceError>;
}

/// Reads `<root>/<layout_name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, layout_name: &str) -> PathBuf {
        layout_path(&self.root, layout_name)
    }
}

pub fn layout_path(root: &Path, layout_name: &str) -> PathBuf {
    root.join(format!("{layout_name}.json"))
}

impl LayoutSource for DirectorySource {
    fn fetch(&self, layout_name: &str) -> Result<String, SourceError> {
        let path = self.path_for(layout_name);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(layout_name.to_string()))
            }
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, layout_name: &str, contents: impl Into<String>) -> Self {
        self.insert(layout_name, contents);
        self
    }

    pub fn insert(&mut self, layout_name: &str, contents: impl Into<String>) {
        self.documents.insert(layout_name.to_string(), contents.into());
    }
}

impl LayoutSource for MemorySource {
    fn fetch(&self, layout_name: &str) -> Result<String, SourceError> {
        self.documents
            .get(layout_name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(layout_name.to_string()))
    }
}

/// Source with nothing in it; every diagram falls back to automatic layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl LayoutSource for NoSource {
    fn fetch(&self, layout_name: &str) -> Result<String, SourceError> {
        Err(SourceError::NotFound(layout_name.to_string()))
    }
}

/// Loads the saved positions for `layout_name`, or `None` if there is no
/// usable document.
pub fn load_override(source: &dyn LayoutSource, layout_name: &str) -> Option<PositionMap> {
    let contents = match source.fetch(layout_name) {
        Ok(contents) => contents,
        Err(SourceError::NotFound(_)) => {
            debug!(layout = layout_name; "No saved layout, using automatic layout");
            return None;
        }
        Err(err) => {
            debug!(layout = layout_name; "Saved layout unavailable: {err}");
            return None;
        }
    };
    parse_override(layout_name, &contents)
}

/// Normalizes either document shape into a position mapping.
pub fn parse_override(layout_name: &str, contents: &str) -> Option<PositionMap> {
    let document: Value = match serde_json::from_str(contents) {
        Ok(value) => value,
        Err(err) => {
            debug!(layout = layout_name; "Saved layout is not valid JSON: {err}");
            return None;
        }
    };

    let entries = match &document {
        Value::Object(map) => match map.get("nodes") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                debug!(layout = layout_name; "Saved layout `nodes` is not an array");
                return None;
            }
            None => {
                debug!(layout = layout_name; "Saved layout object has no `nodes` field");
                return None;
            }
        },
        Value::Array(entries) => {
            warn!(layout = layout_name; "Saved layout uses the deprecated bare-array format; re-export it");
            entries
        }
        _ => {
            debug!(layout = layout_name; "Saved layout has an unsupported shape");
            return None;
        }
    };

    let mut positions = PositionMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<NodeLayoutEntry>(entry.clone()) {
            Ok(entry) => {
                positions.insert(entry.id, entry.position);
            }
            Err(err) => {
                debug!(layout = layout_name, index = idx; "Skipping malformed saved layout entry: {err}");
            }
        }
    }
    Some(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_current_format() {
        let json = r#"{
            "nodes": [
                {"id": "forecast", "position": {"x": 10, "y": 20}},
                {"id": "zephyr", "position": {"x": 5.5, "y": -3}}
            ],
            "edges": [{"id": "e1", "sourceHandle": "right"}]
        }"#;
        let positions = parse_override("systemOverview", json).expect("document parses");
        assert_eq!(positions.len(), 2);
        assert_eq!(positions["forecast"], Position::new(10.0, 20.0));
        assert_eq!(positions["zephyr"], Position::new(5.5, -3.0));
    }

    #[test]
    fn reads_legacy_bare_array() {
        let json = r#"[{"id": "a", "position": {"x": 1, "y": 2}}]"#;
        let positions = parse_override("legacy", json).expect("legacy parses");
        assert_eq!(positions["a"], Position::new(1.0, 2.0));
    }

    #[test]
    fn ignores_extra_fields() {
        let json = r#"{"nodes": [{"id": "a", "position": {"x": 1, "y": 2, "z": 9}, "width": 4}]}"#;
        let positions = parse_override("extra", json).expect("parses");
        assert_eq!(positions["a"], Position::new(1.0, 2.0));
    }

    #[test]
    fn skips_malformed_entries() {
        let json = r#"{"nodes": [
            {"id": "ok", "position": {"x": 1, "y": 2}},
            {"id": "no-position"},
            {"position": {"x": 1, "y": 2}},
            {"id": 7, "position": {"x": 1, "y": 2}},
            {"id": "bad-x", "position": {"x": "left", "y": 2}},
            "string"
        ]}"#;
        let positions = parse_override("mixed", json).expect("parses");
        assert_eq!(positions.len(), 1);
        assert!(positions.contains_key("ok"));
    }

    #[test]
    fn invalid_documents_are_absent() {
        assert!(parse_override("x", "{not json").is_none());
        assert!(parse_override("x", r#"{"edges": []}"#).is_none());
        assert!(parse_override("x", r#"{"nodes": 3}"#).is_none());
        assert!(parse_override("x", "42").is_none());
    }

    #[test]
    fn empty_nodes_array_is_an_empty_mapping() {
        let positions = parse_override("x", r#"{"nodes": []}"#).expect("parses");
        assert!(positions.is_empty());
    }

    #[test]
    fn missing_documents_are_absent() {
        assert!(load_override(&NoSource, "systemOverview").is_none());
        assert!(load_override(&MemorySource::new(), "systemOverview").is_none());
    }

    #[test]
    fn directory_source_reads_by_layout_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("messageFlow.json"),
            r#"{"nodes": [{"id": "seed", "position": {"x": 3, "y": 4}}], "edges": []}"#,
        )
        .expect("write layout");
        let source = DirectorySource::new(dir.path());
        let positions = load_override(&source, "messageFlow").expect("loads");
        assert_eq!(positions["seed"], Position::new(3.0, 4.0));
        assert!(load_override(&source, "kubernetesInfra").is_none());
        assert!(matches!(
            source.fetch("kubernetesInfra"),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn edge_entries_omit_absent_fields() {
        let document = LayoutDocument {
            nodes: vec![],
            edges: vec![EdgeLayoutEntry {
                id: "e1".to_string(),
                source_handle: Some("right".to_string()),
                target_handle: None,
                data: None,
            }],
        };
        let json = serde_json::to_string(&document).expect("serializes");
        assert_eq!(json, r#"{"nodes":[],"edges":[{"id":"e1","sourceHandle":"right"}]}"#);
    }
}
