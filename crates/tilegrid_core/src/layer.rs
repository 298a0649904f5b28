//! Tile layers: a named, independently visible grid of optional tile ids

use crate::MapError;
use uuid::Uuid;

/// Identifier naming a tile image asset (a file name under the resource directory)
pub type TileId = String;

/// A single tile layer
///
/// Tiles are stored row-major; `None` is an empty cell. The layer's `id` is a
/// session-local identity used to key render resources and never changes when
/// the layer is renamed or reordered.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: Uuid,
    pub name: String,
    pub visible: bool,
    width: u32,
    height: u32,
    tiles: Vec<Option<TileId>>,
}

impl Layer {
    /// Create an empty, visible layer of `width` columns and `height` rows
    pub fn new(name: String, width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            id: Uuid::new_v4(),
            name,
            visible: true,
            width,
            height,
            tiles: vec![None; size],
        }
    }

    /// Build a layer from nested row data, checking it is exactly `height` rows of `width` cells
    pub fn from_rows(
        name: String,
        visible: bool,
        rows: Vec<Vec<Option<TileId>>>,
        width: u32,
        height: u32,
    ) -> Result<Self, MapError> {
        if rows.len() != height as usize {
            return Err(MapError::malformed(format!(
                "layer {name:?} has {} rows, expected {height}",
                rows.len()
            )));
        }
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width as usize {
                return Err(MapError::malformed(format!(
                    "layer {name:?} row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            tiles.extend(row);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            visible,
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Get the tile at a cell (None if empty or out of bounds)
    pub fn get_tile(&self, x: u32, y: u32) -> Option<&str> {
        self.index(x, y)
            .and_then(|i| self.tiles.get(i))
            .and_then(|t| t.as_deref())
    }

    /// Set or clear a cell, returning its previous occupant
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: Option<TileId>) -> Option<TileId> {
        let index = self.index(x, y)?;
        std::mem::replace(&mut self.tiles[index], tile)
    }

    pub fn is_occupied(&self, x: u32, y: u32) -> bool {
        self.get_tile(x, y).is_some()
    }

    /// Iterate occupied cells as `(x, y, tile)`
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u32, u32, &str)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().filter_map(move |(i, t)| {
            t.as_deref()
                .map(|tile| ((i % width) as u32, (i / width) as u32, tile))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Nested row-major copy of the grid (the persisted `grid_data` shape)
    pub fn to_rows(&self) -> Vec<Vec<Option<TileId>>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height as usize];
        }
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.to_vec())
            .collect()
    }
}
