//! Retained render state for the editor viewport
//!
//! Every occupied cell of every layer owns exactly one sprite in a
//! generational arena. The handle table is keyed by `(layer id, x, y)`, so a
//! handle can never be shared between layers and a released handle can never
//! be resolved again.

use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;
use thunderdome::{Arena, Index};
use tilegrid_core::{CoordinateMapper, MapDocument, TileId};
use tracing::debug;
use uuid::Uuid;

use crate::resources::TileImageCache;

/// Opaque handle to a drawn tile instance
pub type SpriteHandle = Index;

/// A drawn tile instance, positioned in map pixel space
#[derive(Debug, Clone)]
pub struct Sprite {
    pub tile: TileId,
    pub cell: (u32, u32),
    pub image: Arc<RgbaImage>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
}

/// A grid line segment in map pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLine {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

/// Grid lines over the scaled map extent, closing edges included
///
/// Empty when the document hides its grid.
pub fn grid_lines(doc: &MapDocument) -> Vec<GridLine> {
    if !doc.show_grid {
        return Vec::new();
    }
    let (cell_width, cell_height) = doc.mapper.cell_size();
    let (width, height) = doc.mapper.map_extent(doc.rows(), doc.cols());
    let (width, height) = (pixel(width), pixel(height));
    let vertical = (0..=doc.cols()).map(|col| {
        let x = pixel(col.saturating_mul(cell_width));
        GridLine {
            from: (x, 0),
            to: (x, height),
        }
    });
    let horizontal = (0..=doc.rows()).map(|row| {
        let y = pixel(row.saturating_mul(cell_height));
        GridLine {
            from: (0, y),
            to: (width, y),
        }
    });
    vertical.chain(horizontal).collect()
}

fn pixel(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Tracks the sprites currently alive for the document being edited
pub struct RenderState {
    sprites: Arena<Sprite>,
    handles: HashMap<(Uuid, u32, u32), SpriteHandle>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            sprites: Arena::new(),
            handles: HashMap::new(),
        }
    }
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sprite for a cell
    ///
    /// Any sprite already at the cell is released first.
    pub fn spawn(&mut self, layer: Uuid, sprite: Sprite) -> SpriteHandle {
        let (x, y) = sprite.cell;
        self.release(layer, x, y);
        let handle = self.sprites.insert(sprite);
        self.handles.insert((layer, x, y), handle);
        handle
    }

    /// Release the sprite at a cell; returns whether one existed
    pub fn release(&mut self, layer: Uuid, x: u32, y: u32) -> bool {
        match self.handles.remove(&(layer, x, y)) {
            Some(handle) => {
                self.sprites.remove(handle);
                true
            }
            None => false,
        }
    }

    /// Release every sprite owned by a layer, returning how many were released
    pub fn release_layer(&mut self, layer: Uuid) -> usize {
        let cells: Vec<_> = self
            .handles
            .keys()
            .filter(|(id, _, _)| *id == layer)
            .copied()
            .collect();
        for (id, x, y) in &cells {
            self.release(*id, *x, *y);
        }
        debug!("Released {} sprites of layer {}", cells.len(), layer);
        cells.len()
    }

    /// Release everything
    pub fn clear(&mut self) {
        self.handles.clear();
        self.sprites.clear();
    }

    pub fn handle(&self, layer: Uuid, x: u32, y: u32) -> Option<SpriteHandle> {
        self.handles.get(&(layer, x, y)).copied()
    }

    /// Resolve a handle; released handles resolve to `None`
    pub fn sprite(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.sprites.get(handle)
    }

    pub fn sprite_at(&self, layer: Uuid, x: u32, y: u32) -> Option<&Sprite> {
        self.handle(layer, x, y).and_then(|h| self.sprites.get(h))
    }

    /// Number of sprites owned by a layer
    pub fn handle_count(&self, layer: Uuid) -> usize {
        self.handles.keys().filter(|(id, _, _)| *id == layer).count()
    }

    /// Cells of a layer that currently own a sprite
    pub fn cells(&self, layer: Uuid) -> Vec<(u32, u32)> {
        let mut cells: Vec<_> = self
            .handles
            .keys()
            .filter(|(id, _, _)| *id == layer)
            .map(|(_, x, y)| (*x, *y))
            .collect();
        cells.sort_unstable_by_key(|&(x, y)| (y, x));
        cells
    }

    /// Total live sprites across all layers
    pub fn live_sprites(&self) -> usize {
        self.sprites.len()
    }

    /// Show or hide a layer's sprites without destroying them
    pub fn set_layer_visible(&mut self, layer: Uuid, visible: bool) {
        for ((id, _, _), handle) in &self.handles {
            if *id == layer {
                if let Some(sprite) = self.sprites.get_mut(*handle) {
                    sprite.visible = visible;
                }
            }
        }
    }

    /// Reposition and rescale every sprite for the mapper's current cell size
    pub fn relayout(&mut self, mapper: &CoordinateMapper, tiles: &TileImageCache) {
        for (_, sprite) in self.sprites.iter_mut() {
            let rect = mapper.cell_rect(sprite.cell.0, sprite.cell.1);
            sprite.x = rect.x;
            sprite.y = rect.y;
            sprite.width = rect.width;
            sprite.height = rect.height;
            if let Some(image) = tiles.get(&sprite.tile) {
                sprite.image = image;
            }
        }
    }

    /// Visible sprites in paint order: layers bottom to top, cells row-major
    pub fn draw_list<'a>(&'a self, doc: &MapDocument) -> Vec<&'a Sprite> {
        let mut out = Vec::new();
        for layer in doc.layers().iter().filter(|l| l.visible) {
            for (x, y, _) in layer.occupied_cells() {
                if let Some(sprite) = self.sprite_at(layer.id, x, y) {
                    out.push(sprite);
                }
            }
        }
        out
    }
}
