use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub monospace_font_family: String,
    pub background: String,
    pub grid_color: String,
    pub grid_spacing: f32,
    pub edge_label_background: String,
    pub edge_label_color: String,
    pub edge_label_font_size: f32,
    pub default_marker_color: String,
    pub node_border_color: String,
    pub minimap_background: String,
    pub minimap_node_color: String,
    pub minimap_mask_color: String,
    pub minimap_border_color: String,
}

impl Theme {
    /// Light canvas with a dotted grid.
    pub fn light() -> Self {
        Self {
            font_family: "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif".to_string(),
            monospace_font_family: "ui-monospace, Menlo, Consolas, monospace".to_string(),
            background: "#ffffff".to_string(),
            grid_color: "#e5e7eb".to_string(),
            grid_spacing: 16.0,
            edge_label_background: "#ffffff".to_string(),
            edge_label_color: "#374151".to_string(),
            edge_label_font_size: 11.0,
            default_marker_color: "#b1b1b7".to_string(),
            node_border_color: "rgba(0, 0, 0, 0.08)".to_string(),
            minimap_background: "#ffffff".to_string(),
            minimap_node_color: "#d1d5db".to_string(),
            minimap_mask_color: "rgba(240, 240, 240, 0.6)".to_string(),
            minimap_border_color: "#d1d5db".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#111827".to_string(),
            grid_color: "#374151".to_string(),
            edge_label_background: "#1f2937".to_string(),
            edge_label_color: "#e5e7eb".to_string(),
            node_border_color: "rgba(255, 255, 255, 0.12)".to_string(),
            minimap_background: "#1f2937".to_string(),
            minimap_node_color: "#4b5563".to_string(),
            minimap_mask_color: "rgba(17, 24, 39, 0.6)".to_string(),
            minimap_border_color: "#4b5563".to_string(),
            ..Self::light()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "light" | "default" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
