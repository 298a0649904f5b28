//! Persisted map file format
//!
//! The JSON shape is read by external renderers, so field names and nesting
//! must stay stable:
//!
//! ```json
//! {
//!     "grid_width": 32, "grid_height": 32, "zoom_level": 1.0, "show_grid": true,
//!     "rows": 10, "cols": 10, "background_music": null,
//!     "layers": [{ "name": "Layer_1", "visible": true, "grid_data": [[null, "grass.png"]] }],
//!     "image_cache": { "grass.png": "grass.png" }
//! }
//! ```

use crate::{CoordinateMapper, Layer, MapDocument, MapError, TileId, DEFAULT_LAYER_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Indentation used when writing map files
pub const DEFAULT_INDENT: usize = 4;

fn default_dimension() -> u32 {
    10
}

/// One layer as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub visible: bool,
    /// `rows` rows of `cols` cells
    pub grid_data: Vec<Vec<Option<TileId>>>,
}

/// A complete map as stored on disk
///
/// Render resources are never part of the record; they are rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub grid_width: u32,
    pub grid_height: u32,
    pub zoom_level: f64,
    pub show_grid: bool,
    #[serde(default = "default_dimension")]
    pub rows: u32,
    #[serde(default = "default_dimension")]
    pub cols: u32,
    #[serde(default)]
    pub background_music: Option<String>,
    pub layers: Vec<LayerRecord>,
    /// Manifest of every referenced tile id, mapped to itself
    pub image_cache: BTreeMap<TileId, TileId>,
}

/// How layer names are assigned when a record becomes a document
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Prefix for resynthesized names
    pub layer_prefix: String,
    /// Keep the names stored in the file instead of renaming layers sequentially
    pub preserve_layer_names: bool,
    /// Minimum zoom for subsequent zoom steps
    pub min_zoom: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            layer_prefix: DEFAULT_LAYER_PREFIX.to_string(),
            preserve_layer_names: false,
            min_zoom: crate::DEFAULT_MIN_ZOOM,
        }
    }
}

impl MapFile {
    /// Snapshot a document into its persisted form
    pub fn from_document(doc: &MapDocument) -> Self {
        let (grid_width, grid_height) = doc.mapper.base_size();
        Self {
            grid_width,
            grid_height,
            zoom_level: doc.mapper.zoom(),
            show_grid: doc.show_grid,
            rows: doc.rows(),
            cols: doc.cols(),
            background_music: doc.background_music.clone(),
            layers: doc
                .layers()
                .iter()
                .map(|layer| LayerRecord {
                    name: layer.name.clone(),
                    visible: layer.visible,
                    grid_data: layer.to_rows(),
                })
                .collect(),
            image_cache: doc
                .tile_ids()
                .into_iter()
                .map(|id| (id.clone(), id))
                .collect(),
        }
    }

    /// Check dimensions and grid shapes without building a document
    pub fn validate(&self) -> Result<(), MapError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MapError::malformed(format!(
                "map must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(MapError::malformed(format!(
                "cell size must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(MapError::malformed(format!(
                "map of {}x{} cells is too large",
                self.rows, self.cols
            )));
        }
        if !self.zoom_level.is_finite() || self.zoom_level <= 0.0 {
            return Err(MapError::malformed(format!(
                "zoom level must be positive, got {}",
                self.zoom_level
            )));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.grid_data.len() != self.rows as usize
                || layer.grid_data.iter().any(|r| r.len() != self.cols as usize)
            {
                return Err(MapError::malformed(format!(
                    "layer {i} ({:?}) grid does not match {}x{}",
                    layer.name, self.rows, self.cols
                )));
            }
        }
        Ok(())
    }

    /// Every tile id the map needs: manifest keys plus anything used in a grid
    pub fn referenced_tiles(&self) -> Vec<TileId> {
        let mut ids: Vec<TileId> = self.image_cache.keys().cloned().collect();
        for layer in &self.layers {
            for tile in layer.grid_data.iter().flatten().flatten() {
                ids.push(tile.clone());
            }
        }
        ids.sort();
        ids.dedup();
        ids
    }

    /// Rebuild a document from the record
    ///
    /// Layers are renamed `prefix1`, `prefix2`, ... in file order unless
    /// `preserve_layer_names` is set. The first layer becomes current.
    pub fn into_document(self, options: &LoadOptions) -> Result<MapDocument, MapError> {
        self.validate()?;
        let mut doc = MapDocument::new(self.rows, self.cols, self.grid_width, self.grid_height)?
            .with_layer_prefix(options.layer_prefix.clone());
        doc.mapper = CoordinateMapper::new(self.grid_width, self.grid_height)
            .with_zoom(self.zoom_level)
            .with_min_zoom(options.min_zoom);
        doc.show_grid = self.show_grid;
        doc.background_music = self.background_music;

        for (i, record) in self.layers.into_iter().enumerate() {
            let name = if options.preserve_layer_names {
                record.name
            } else {
                format!("{}{}", options.layer_prefix, i + 1)
            };
            let layer =
                Layer::from_rows(name, record.visible, record.grid_data, self.cols, self.rows)?;
            doc.push_layer(layer).map_err(|e| match e {
                MapError::DuplicateLayerName(name) => {
                    MapError::malformed(format!("duplicate layer name {name:?}"))
                }
                other => other,
            })?;
        }
        // Synthesized names continue after the loaded ones
        let loaded = doc.layers().len() as u32;
        doc.reserve_layer_names(loaded);
        Ok(doc)
    }

    /// Serialize to JSON with the given indentation width
    pub fn to_json_string(&self, indent: usize) -> Result<String, MapError> {
        let indent = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)
            .map_err(|e| MapError::Serialize(e.to_string()))?;
        String::from_utf8(out).map_err(|e| MapError::Serialize(e.to_string()))
    }

    /// Parse JSON; structural problems are reported as malformed documents
    pub fn from_json_str(content: &str) -> Result<Self, MapError> {
        serde_json::from_str(content).map_err(|e| {
            if e.is_data() {
                MapError::MalformedDocument(e.to_string())
            } else {
                MapError::Parse(e.to_string())
            }
        })
    }

    /// Load a map file from disk
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let content = std::fs::read_to_string(path).map_err(|e| MapError::Io(e.to_string()))?;
        let map = Self::from_json_str(&content)?;
        map.validate()?;
        info!("Loaded map {:?} ({}x{}, {} layers)", path, map.rows, map.cols, map.layers.len());
        Ok(map)
    }

    /// Write a map file to disk
    pub fn save(&self, path: &Path, indent: usize) -> Result<(), MapError> {
        let content = self.to_json_string(indent)?;
        std::fs::write(path, content).map_err(|e| MapError::Io(e.to_string()))?;
        info!("Saved map to {:?}", path);
        Ok(())
    }
}
