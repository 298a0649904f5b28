//! The map document: grid dimensions, view state and the ordered layer store

use crate::{CoordinateMapper, Layer, MapError, TileId};
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

/// Prefix for synthesized layer names
pub const DEFAULT_LAYER_PREFIX: &str = "Layer_";

/// Direction for reordering a layer in the layer list
///
/// `Up` moves toward index 0, `Down` toward the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDirection {
    Up,
    Down,
}

/// A layered tile map
///
/// Layer order is paint order: index 0 is drawn first.
#[derive(Debug, Clone)]
pub struct MapDocument {
    rows: u32,
    cols: u32,
    pub show_grid: bool,
    pub background_music: Option<String>,
    pub mapper: CoordinateMapper,
    layers: Vec<Layer>,
    current_layer: Option<String>,
    layer_prefix: String,
    layer_counter: u32,
}

impl MapDocument {
    /// Create an empty document with `rows x cols` cells of `cell_width x cell_height` base pixels
    pub fn new(rows: u32, cols: u32, cell_width: u32, cell_height: u32) -> Result<Self, MapError> {
        if rows == 0 || cols == 0 {
            return Err(MapError::malformed(format!(
                "map must have at least one row and column, got {rows}x{cols}"
            )));
        }
        if cell_width == 0 || cell_height == 0 {
            return Err(MapError::malformed(format!(
                "cell size must be positive, got {cell_width}x{cell_height}"
            )));
        }
        if rows.checked_mul(cols).is_none() {
            return Err(MapError::malformed(format!(
                "map of {rows}x{cols} cells is too large"
            )));
        }
        Ok(Self {
            rows,
            cols,
            show_grid: true,
            background_music: None,
            mapper: CoordinateMapper::new(cell_width, cell_height),
            layers: Vec::new(),
            current_layer: None,
            layer_prefix: DEFAULT_LAYER_PREFIX.to_string(),
            layer_counter: 1,
        })
    }

    /// Use a different prefix for synthesized layer names
    pub fn with_layer_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.layer_prefix = prefix.into();
        self
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn layer_prefix(&self) -> &str {
        &self.layer_prefix
    }

    /// Whether a (possibly negative) cell coordinate lies inside the grid
    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cols && (y as u32) < self.rows
    }

    /// Convert a cell coordinate to unsigned form if it is in bounds
    pub fn cell(&self, x: i32, y: i32) -> Result<(u32, u32), MapError> {
        if self.is_in_bounds(x, y) {
            Ok((x as u32, y as u32))
        } else {
            Err(MapError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            })
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn layer_by_id(&self, id: Uuid) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_by_id_mut(&mut self, id: Uuid) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    pub fn current_layer_name(&self) -> Option<&str> {
        self.current_layer.as_deref()
    }

    pub fn current_layer(&self) -> Option<&Layer> {
        self.current_layer.as_deref().and_then(|name| self.layer(name))
    }

    pub fn current_layer_mut(&mut self) -> Option<&mut Layer> {
        let name = self.current_layer.clone()?;
        self.layer_mut(&name)
    }

    /// Make the next synthesized name start after `count`
    pub(crate) fn reserve_layer_names(&mut self, count: u32) {
        self.layer_counter = self.layer_counter.max(count + 1);
    }

    fn next_layer_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.layer_prefix, self.layer_counter);
            self.layer_counter += 1;
            if self.layer(&name).is_none() {
                return name;
            }
        }
    }

    /// Append a new empty layer on top of the stack
    ///
    /// Without a name, one is synthesized from the layer prefix and a counter.
    /// The first layer of a document becomes the current layer.
    pub fn create_layer(&mut self, name: Option<&str>) -> Result<&Layer, MapError> {
        let name = match name {
            Some(name) if self.layer(name).is_some() => {
                return Err(MapError::DuplicateLayerName(name.to_string()));
            }
            Some(name) => name.to_string(),
            None => self.next_layer_name(),
        };
        self.push_layer(Layer::new(name, self.cols, self.rows))
    }

    /// Append an already-built layer, enforcing dimensions and name uniqueness
    pub fn push_layer(&mut self, layer: Layer) -> Result<&Layer, MapError> {
        if layer.width() != self.cols || layer.height() != self.rows {
            return Err(MapError::malformed(format!(
                "layer {:?} is {}x{}, map is {}x{}",
                layer.name,
                layer.height(),
                layer.width(),
                self.rows,
                self.cols
            )));
        }
        if self.layer(&layer.name).is_some() {
            return Err(MapError::DuplicateLayerName(layer.name));
        }
        debug!("Created layer {:?}", layer.name);
        if self.current_layer.is_none() {
            self.current_layer = Some(layer.name.clone());
        }
        self.layers.push(layer);
        Ok(&self.layers[self.layers.len() - 1])
    }

    /// Remove a layer by name, returning it so its render resources can be released
    ///
    /// If it was the current layer, the first remaining layer becomes current.
    pub fn delete_layer(&mut self, name: &str) -> Option<Layer> {
        let index = self.layer_index(name)?;
        let layer = self.layers.remove(index);
        if self.current_layer.as_deref() == Some(name) {
            self.current_layer = self.layers.first().map(|l| l.name.clone());
        }
        debug!("Deleted layer {:?}", name);
        Some(layer)
    }

    /// Swap a layer with its neighbor; returns false at either end of the list
    pub fn move_layer(&mut self, name: &str, direction: LayerDirection) -> bool {
        let Some(index) = self.layer_index(name) else {
            return false;
        };
        let target = match direction {
            LayerDirection::Up if index > 0 => index - 1,
            LayerDirection::Down if index + 1 < self.layers.len() => index + 1,
            _ => return false,
        };
        self.layers.swap(index, target);
        debug!("Moved layer {:?} from {} to {}", name, index, target);
        true
    }

    /// Set a layer's visibility flag; its tiles are untouched
    pub fn set_visibility(&mut self, name: &str, visible: bool) -> bool {
        match self.layer_mut(name) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_current(&mut self, name: &str) -> bool {
        if self.layer(name).is_none() {
            return false;
        }
        self.current_layer = Some(name.to_string());
        true
    }

    /// Rename a layer, rejecting names already in use
    pub fn rename_layer(&mut self, name: &str, new_name: &str) -> Result<(), MapError> {
        if name == new_name {
            return Ok(());
        }
        if self.layer(new_name).is_some() {
            return Err(MapError::DuplicateLayerName(new_name.to_string()));
        }
        let layer = self
            .layer_mut(name)
            .ok_or_else(|| MapError::UnknownLayer(name.to_string()))?;
        layer.name = new_name.to_string();
        if self.current_layer.as_deref() == Some(name) {
            self.current_layer = Some(new_name.to_string());
        }
        Ok(())
    }

    /// Distinct tile ids used anywhere in the document
    pub fn tile_ids(&self) -> BTreeSet<TileId> {
        self.layers
            .iter()
            .flat_map(|l| l.occupied_cells().map(|(_, _, tile)| tile.to_string()))
            .collect()
    }
}
