//! The editing session: one document plus everything needed to draw and change it

mod file;

use std::fmt;
use std::path::PathBuf;
use tilegrid_core::{
    CoordinateMapper, Layer, LayerDirection, MapDocument, MapFile, PixelRect, TileId,
};
use tracing::{debug, info};

use crate::render::{self, GridLine, RenderState, Sprite};
use crate::resources::{DirectoryProvider, ResourceProvider, TileImageCache};
use crate::settings::EditorSettings;
use crate::tools::{Painter, RegionPaint};
use crate::EditorError;

/// Text shown in the host's status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    /// Cell under the cursor, clamped into the map
    pub cell: (u32, u32),
    pub offset: (i32, i32),
    pub zoom_percent: u32,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position ({}, {}) Offset ({}, {})  Zoom ({}%)",
            self.cell.0, self.cell.1, self.offset.0, self.offset.1, self.zoom_percent
        )
    }
}

/// An open map and its editing state
pub struct Editor {
    pub(crate) document: MapDocument,
    pub(crate) render: RenderState,
    pub(crate) tiles: TileImageCache,
    pub(crate) provider: Box<dyn ResourceProvider>,
    pub(crate) region: RegionPaint,
    pub(crate) settings: EditorSettings,
    pub(crate) selected_tile: Option<TileId>,
    /// Last pointer position inside the viewport
    pub(crate) pointer: Option<(i32, i32)>,
    /// Pointer position at the last middle-button event
    pub(crate) pan_anchor: Option<(i32, i32)>,
    pub(crate) path: Option<PathBuf>,
}

impl Editor {
    /// Start with an empty map sized by the settings' new-map defaults
    pub fn new(
        settings: EditorSettings,
        provider: Box<dyn ResourceProvider>,
    ) -> Result<Self, EditorError> {
        let document = blank_document(
            &settings,
            settings.default_rows,
            settings.default_cols,
            settings.default_cell_width,
            settings.default_cell_height,
            settings.default_zoom,
        )?;
        let (cell_width, cell_height) = document.mapper.cell_size();
        Ok(Self {
            document,
            render: RenderState::new(),
            tiles: TileImageCache::new(cell_width, cell_height),
            provider,
            region: RegionPaint::new(),
            settings,
            selected_tile: None,
            pointer: None,
            pan_anchor: None,
            path: None,
        })
    }

    /// Start with tiles resolved from the settings' resource directory
    pub fn from_settings(settings: EditorSettings) -> Result<Self, EditorError> {
        let provider = DirectoryProvider::new(&settings.resource_dir);
        info!("Resolving tiles from {:?}", provider.root());
        Self::new(settings, Box::new(provider))
    }

    pub fn document(&self) -> &MapDocument {
        &self.document
    }

    pub fn render(&self) -> &RenderState {
        &self.render
    }

    pub fn tiles(&self) -> &TileImageCache {
        &self.tiles
    }

    pub fn region(&self) -> &RegionPaint {
        &self.region
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn selected_tile(&self) -> Option<&str> {
        self.selected_tile.as_deref()
    }

    /// Choose the tile the next left press paints with
    pub fn select_tile(&mut self, tile: Option<TileId>) {
        self.selected_tile = tile;
    }

    /// File the map was last opened from or saved to
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Visible sprites in paint order
    pub fn draw_list(&self) -> Vec<&Sprite> {
        self.render.draw_list(&self.document)
    }

    pub fn grid_lines(&self) -> Vec<GridLine> {
        render::grid_lines(&self.document)
    }

    /// In-bounds cell under the pointer, if any
    pub fn hovered_cell(&self) -> Option<(u32, u32)> {
        let (px, py) = self.pointer?;
        let (x, y) = self.document.mapper.to_grid_cell(px, py);
        self.document.cell(x, y).ok()
    }

    /// Map-space rectangle of the hovered cell, for the highlight overlay
    pub fn hover_rect(&self) -> Option<PixelRect> {
        self.hovered_cell()
            .map(|(x, y)| self.document.mapper.cell_rect(x, y))
    }

    /// Map-space rectangle of the region being dragged
    pub fn selection_rect(&self) -> Option<PixelRect> {
        let region = self.region.region()?;
        Some(self.document.mapper.region_rect(
            (region.min_x, region.min_y),
            (region.max_x, region.max_y),
        ))
    }

    /// Status for a viewport pixel: cell clamped into the map, pan offset and zoom
    pub fn status_at(&self, px: i32, py: i32) -> StatusLine {
        let mapper = &self.document.mapper;
        let (x, y) = mapper.to_grid_cell(px, py);
        let clamp = |v: i32, len: u32| {
            let last = i32::try_from(len).unwrap_or(i32::MAX).saturating_sub(1);
            v.clamp(0, last.max(0)) as u32
        };
        StatusLine {
            cell: (clamp(x, self.document.cols()), clamp(y, self.document.rows())),
            offset: mapper.offset(),
            zoom_percent: mapper.zoom_percent(),
        }
    }

    /// Replace the document with an empty map
    ///
    /// The zoom level and grid flag carry over. Every sprite and cached tile
    /// is released, and the selected tile and background music are cleared.
    pub fn new_map(
        &mut self,
        rows: u32,
        cols: u32,
        cell_width: u32,
        cell_height: u32,
    ) -> Result<(), EditorError> {
        let mut document = blank_document(
            &self.settings,
            rows,
            cols,
            cell_width,
            cell_height,
            self.document.mapper.zoom(),
        )?;
        document.show_grid = self.document.show_grid;

        self.region.reset();
        self.render.clear();
        let (width, height) = document.mapper.cell_size();
        self.tiles.reset(width, height);
        self.document = document;
        self.selected_tile = None;
        self.pan_anchor = None;
        self.path = None;
        info!("New map {}x{} ({}x{} px cells)", rows, cols, cell_width, cell_height);
        Ok(())
    }

    /// Set or clear the background music reference stored with the map
    pub fn set_background_music(&mut self, music: Option<String>) {
        self.document.background_music = music;
    }

    /// Flip grid line display; returns the new state
    pub fn toggle_grid(&mut self) -> bool {
        self.document.show_grid = !self.document.show_grid;
        self.document.show_grid
    }

    /// Add an empty layer on top; returns its name
    pub fn create_layer(&mut self, name: Option<&str>) -> Result<String, EditorError> {
        let layer = self.document.create_layer(name)?;
        Ok(layer.name.clone())
    }

    /// Remove a layer and release its sprites; unknown names are a no-op
    pub fn delete_layer(&mut self, name: &str) -> bool {
        let Some(id) = self.document.layer(name).map(|l| l.id) else {
            return false;
        };
        if self.region.drag().is_some_and(|d| d.layer == id) {
            // The layer and its preview sprites go away together
            self.region.reset();
        }
        if self.document.delete_layer(name).is_none() {
            return false;
        }
        self.render.release_layer(id);
        true
    }

    pub fn move_layer(&mut self, name: &str, direction: LayerDirection) -> bool {
        self.document.move_layer(name, direction)
    }

    /// Show or hide a layer; its sprites are kept either way
    pub fn set_visibility(&mut self, name: &str, visible: bool) -> bool {
        if !self.document.set_visibility(name, visible) {
            return false;
        }
        if let Some(layer) = self.document.layer(name) {
            self.render.set_layer_visible(layer.id, visible);
        }
        true
    }

    pub fn set_current_layer(&mut self, name: &str) -> bool {
        self.document.set_current(name)
    }

    pub fn rename_layer(&mut self, name: &str, new_name: &str) -> Result<(), EditorError> {
        self.document.rename_layer(name, new_name)?;
        Ok(())
    }

    /// Place a tile in one cell of a layer
    ///
    /// Out-of-bounds cells are ignored and return `Ok(false)`.
    pub fn place_tile(
        &mut self,
        layer: &str,
        x: i32,
        y: i32,
        tile: &str,
    ) -> Result<bool, EditorError> {
        let Ok((x, y)) = self.document.cell(x, y) else {
            return Ok(false);
        };
        let (layer, mut painter) = self.layer_and_painter(layer)?;
        Ok(painter.place(layer, x, y, tile)?)
    }

    /// Clear one cell of a layer; returns whether it was occupied
    pub fn erase_tile(&mut self, layer: &str, x: i32, y: i32) -> Result<bool, EditorError> {
        let Ok((x, y)) = self.document.cell(x, y) else {
            return Ok(false);
        };
        let (layer, mut painter) = self.layer_and_painter(layer)?;
        Ok(painter.erase(layer, x, y))
    }

    /// Step the zoom level, rescaling cached tiles and repositioning every sprite
    ///
    /// An active drag is cancelled first. Returns whether the zoom changed.
    /// If a tile cannot be reloaded at the new size the zoom level is kept.
    pub fn set_zoom(&mut self, delta: f64) -> Result<bool, EditorError> {
        self.cancel_drag()?;
        let mut mapper = self.document.mapper.clone();
        if !mapper.set_zoom(delta) {
            return Ok(false);
        }
        let (width, height) = mapper.cell_size();
        self.tiles.set_cell_size(width, height, &*self.provider)?;
        self.document.mapper = mapper;
        self.render.relayout(&self.document.mapper, &self.tiles);
        debug!(
            "Zoom {}% ({}x{} px cells)",
            self.document.mapper.zoom_percent(),
            width,
            height
        );
        Ok(true)
    }

    /// Center the map in a canvas of the given size
    pub fn center_map(&mut self, canvas_width: u32, canvas_height: u32) {
        let (rows, cols) = (self.document.rows(), self.document.cols());
        self.document
            .mapper
            .center_in(canvas_width, canvas_height, rows, cols);
    }

    /// Handle a viewport resize: cancel any drag and re-center the map
    pub fn resize(&mut self, canvas_width: u32, canvas_height: u32) -> Result<(), EditorError> {
        self.cancel_drag()?;
        self.center_map(canvas_width, canvas_height);
        Ok(())
    }

    /// Snapshot the document in its persisted form
    pub fn serialize(&self) -> Result<MapFile, EditorError> {
        if self.region.is_selecting() {
            return Err(EditorError::DragInProgress);
        }
        Ok(MapFile::from_document(&self.document))
    }

    /// Replace the document with a loaded map
    ///
    /// Every referenced tile is resolved and every sprite is built before the
    /// current document is touched, so a failed load leaves it unchanged.
    pub fn deserialize(&mut self, file: MapFile) -> Result<(), EditorError> {
        let referenced = file.referenced_tiles();
        let document = file.into_document(&self.settings.load_options())?;

        let (width, height) = document.mapper.cell_size();
        let mut tiles = TileImageCache::new(width, height);
        for id in &referenced {
            tiles.get_or_load(id, &*self.provider)?;
        }
        let mut render = RenderState::new();
        let mut painter = Painter {
            render: &mut render,
            tiles: &mut tiles,
            provider: &*self.provider,
            mapper: document.mapper.clone(),
        };
        let mut sprites = 0;
        for layer in document.layers() {
            sprites += painter.install_layer(layer)?;
        }

        self.region.reset();
        self.render.clear();
        self.render = render;
        self.tiles = tiles;
        self.document = document;
        self.pan_anchor = None;
        info!(
            "Loaded {}x{} map with {} layers and {} tiles",
            self.document.rows(),
            self.document.cols(),
            self.document.layers().len(),
            sprites
        );
        Ok(())
    }

    /// Split borrows: a named layer plus a painter over the rest of the session
    fn layer_and_painter(&mut self, name: &str) -> Result<(&mut Layer, Painter<'_>), EditorError> {
        let painter = Painter {
            render: &mut self.render,
            tiles: &mut self.tiles,
            provider: &*self.provider,
            mapper: self.document.mapper.clone(),
        };
        let layer = self
            .document
            .layer_mut(name)
            .ok_or_else(|| tilegrid_core::MapError::UnknownLayer(name.to_string()))?;
        Ok((layer, painter))
    }
}

fn blank_document(
    settings: &EditorSettings,
    rows: u32,
    cols: u32,
    cell_width: u32,
    cell_height: u32,
    zoom: f64,
) -> Result<MapDocument, EditorError> {
    let mut document = MapDocument::new(rows, cols, cell_width, cell_height)?
        .with_layer_prefix(settings.layer_name_prefix.clone());
    document.mapper = CoordinateMapper::new(cell_width, cell_height)
        .with_zoom(zoom)
        .with_min_zoom(settings.min_zoom);
    Ok(document)
}
