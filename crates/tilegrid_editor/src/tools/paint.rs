//! Single-cell placement and erasure

use tilegrid_core::{CoordinateMapper, Layer};

use crate::render::{RenderState, Sprite};
use crate::resources::{ResourceError, ResourceProvider, TileImageCache};

/// Everything needed to change a cell and keep its sprite in step
///
/// Holds a copy of the mapper so the document's layers can be borrowed
/// mutably alongside it.
pub struct Painter<'a> {
    pub render: &'a mut RenderState,
    pub tiles: &'a mut TileImageCache,
    pub provider: &'a dyn ResourceProvider,
    pub mapper: CoordinateMapper,
}

impl Painter<'_> {
    /// Place a tile in one cell, replacing whatever was there
    ///
    /// The image is resolved before the cell is touched, so an unknown asset
    /// leaves the cell unchanged. Returns `Ok(false)` for cells outside the layer.
    pub fn place(
        &mut self,
        layer: &mut Layer,
        x: u32,
        y: u32,
        tile: &str,
    ) -> Result<bool, ResourceError> {
        if x >= layer.width() || y >= layer.height() {
            return Ok(false);
        }
        let image = self.tiles.get_or_load(tile, self.provider)?;
        self.render.release(layer.id, x, y);
        layer.set_tile(x, y, Some(tile.to_string()));
        let rect = self.mapper.cell_rect(x, y);
        self.render.spawn(
            layer.id,
            Sprite {
                tile: tile.to_string(),
                cell: (x, y),
                image,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                visible: layer.visible,
            },
        );
        Ok(true)
    }

    /// Clear one cell and release its sprite; returns whether it was occupied
    pub fn erase(&mut self, layer: &mut Layer, x: u32, y: u32) -> bool {
        let released = self.render.release(layer.id, x, y);
        let previous = layer.set_tile(x, y, None);
        debug_assert_eq!(released, previous.is_some());
        previous.is_some()
    }

    /// Create sprites for every occupied cell of a freshly loaded layer
    pub fn install_layer(&mut self, layer: &Layer) -> Result<usize, ResourceError> {
        let mut count = 0;
        for (x, y, tile) in layer.occupied_cells() {
            let image = self.tiles.get_or_load(tile, self.provider)?;
            let rect = self.mapper.cell_rect(x, y);
            self.render.spawn(
                layer.id,
                Sprite {
                    tile: tile.to_string(),
                    cell: (x, y),
                    image,
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    visible: layer.visible,
                },
            );
            count += 1;
        }
        Ok(count)
    }
}
