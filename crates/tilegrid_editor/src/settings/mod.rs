//! Editor settings persisted between sessions

mod file;

pub use file::SettingsError;

use serde::{Deserialize, Serialize};
use tilegrid_core::{LoadOptions, DEFAULT_INDENT, DEFAULT_LAYER_PREFIX, DEFAULT_MIN_ZOOM, ZOOM_STEP};

/// User-tunable editor defaults
///
/// Every field falls back to its default when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Rows of a new map
    pub default_rows: u32,
    /// Columns of a new map
    pub default_cols: u32,
    /// Base cell width of a new map, in pixels
    pub default_cell_width: u32,
    /// Base cell height of a new map, in pixels
    pub default_cell_height: u32,
    /// Zoom level the editor starts at
    pub default_zoom: f64,
    /// Zoom change per wheel notch
    pub zoom_step: f64,
    pub min_zoom: f64,
    /// Directory tile ids are resolved against
    pub resource_dir: String,
    pub layer_name_prefix: String,
    /// Keep stored layer names when opening a map
    pub preserve_layer_names_on_load: bool,
    /// Indentation width of saved map files
    pub save_indent: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_rows: 10,
            default_cols: 10,
            default_cell_width: 32,
            default_cell_height: 32,
            default_zoom: 1.0,
            zoom_step: ZOOM_STEP,
            min_zoom: DEFAULT_MIN_ZOOM,
            resource_dir: "Resources".to_string(),
            layer_name_prefix: DEFAULT_LAYER_PREFIX.to_string(),
            preserve_layer_names_on_load: false,
            save_indent: DEFAULT_INDENT,
        }
    }
}

impl EditorSettings {
    /// Options for turning a loaded map file into a document
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            layer_prefix: self.layer_name_prefix.clone(),
            preserve_layer_names: self.preserve_layer_names_on_load,
            min_zoom: self.min_zoom,
        }
    }
}
