//! Pointer and wheel input for the map viewport

mod paint;
mod region;

pub use paint::Painter;
pub use region::{CellRegion, Drag, RegionPaint};

use tilegrid_core::Layer;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::Editor;
use crate::EditorError;

/// Pointer buttons the viewport reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Paint: press starts a region drag, release commits it
    Left,
    /// Pan the view while held
    Middle,
    /// Erase the cell under the pointer
    Right,
}

impl Editor {
    /// Handle a button press at a viewport pixel
    ///
    /// A left press only starts a drag on an in-bounds cell with a selected
    /// tile and a current layer. The tile is resolved up front so an unknown
    /// asset is reported before anything changes.
    pub fn pointer_pressed(
        &mut self,
        button: PointerButton,
        px: i32,
        py: i32,
    ) -> Result<(), EditorError> {
        self.pointer = Some((px, py));
        match button {
            PointerButton::Middle => {
                self.pan_anchor = Some((px, py));
            }
            PointerButton::Left => {
                if self.region.is_selecting() {
                    return Ok(());
                }
                let Some(tile) = self.selected_tile.clone() else {
                    warn!("No tile selected, ignoring paint");
                    return Ok(());
                };
                let Some(layer) = self.document.current_layer().map(|l| l.id) else {
                    warn!("No current layer, ignoring paint");
                    return Ok(());
                };
                let Some(cell) = self.cell_at(px, py) else {
                    return Ok(());
                };
                self.tiles.get_or_load(&tile, &*self.provider)?;
                self.region.begin(layer, tile, cell);
            }
            PointerButton::Right => {
                if self.region.is_selecting() {
                    return Ok(());
                }
                let Some(name) = self.document.current_layer_name().map(str::to_string) else {
                    return Ok(());
                };
                let (x, y) = self.document.mapper.to_grid_cell(px, py);
                self.erase_tile(&name, x, y)?;
            }
        }
        Ok(())
    }

    /// Handle pointer motion: pan, hover and region preview
    ///
    /// A failed preview cancels the drag before the error is returned.
    pub fn pointer_moved(&mut self, px: i32, py: i32) -> Result<(), EditorError> {
        self.pointer = Some((px, py));
        if let Some((ax, ay)) = self.pan_anchor {
            self.document.mapper.pan(px.saturating_sub(ax), py.saturating_sub(ay));
            self.pan_anchor = Some((px, py));
        }

        let Some(layer_id) = self.region.drag().map(|d| d.layer) else {
            return Ok(());
        };
        let Some(cell) = self.cell_at(px, py) else {
            return Ok(());
        };
        let Some((layer, region, mut painter)) = self.drag_parts(layer_id) else {
            self.region.reset();
            return Ok(());
        };
        if let Err(e) = region.update(layer, &mut painter, cell) {
            self.cancel_drag()?;
            return Err(e.into());
        }
        Ok(())
    }

    /// Handle a button release; returns the committed region, if any
    ///
    /// Releasing outside the map commits with the last in-bounds end cell.
    pub fn pointer_released(
        &mut self,
        button: PointerButton,
        px: i32,
        py: i32,
    ) -> Result<Option<CellRegion>, EditorError> {
        self.pointer = Some((px, py));
        match button {
            PointerButton::Middle => {
                self.pan_anchor = None;
                Ok(None)
            }
            PointerButton::Right => Ok(None),
            PointerButton::Left => {
                let Some(layer_id) = self.region.drag().map(|d| d.layer) else {
                    return Ok(None);
                };
                if let Some(cell) = self.cell_at(px, py) {
                    self.region.set_end(cell);
                }
                let Some((layer, region, mut painter)) = self.drag_parts(layer_id) else {
                    self.region.reset();
                    return Ok(None);
                };
                Ok(region.commit(layer, &mut painter)?)
            }
        }
    }

    /// The pointer left the viewport
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Zoom one step in (positive delta) or out (negative delta)
    pub fn wheel(&mut self, delta: f64, px: i32, py: i32) -> Result<bool, EditorError> {
        self.pointer = Some((px, py));
        if delta == 0.0 {
            return Ok(false);
        }
        let step = self.settings.zoom_step.copysign(delta);
        self.set_zoom(step)
    }

    /// Abort an active drag, restoring every touched cell; returns whether one was active
    pub fn cancel_drag(&mut self) -> Result<bool, EditorError> {
        let Some(layer_id) = self.region.drag().map(|d| d.layer) else {
            return Ok(false);
        };
        match self.drag_parts(layer_id) {
            Some((layer, region, mut painter)) => Ok(region.cancel(layer, &mut painter)?),
            None => {
                self.region.reset();
                Ok(true)
            }
        }
    }

    fn cell_at(&self, px: i32, py: i32) -> Option<(u32, u32)> {
        let (x, y) = self.document.mapper.to_grid_cell(px, py);
        self.document.cell(x, y).ok()
    }

    /// Split borrows: the drag's layer, the drag state and a painter over the rest
    fn drag_parts(
        &mut self,
        layer_id: Uuid,
    ) -> Option<(&mut Layer, &mut RegionPaint, Painter<'_>)> {
        let painter = Painter {
            render: &mut self.render,
            tiles: &mut self.tiles,
            provider: &*self.provider,
            mapper: self.document.mapper.clone(),
        };
        let Some(layer) = self.document.layer_by_id_mut(layer_id) else {
            debug!("Drag layer {} no longer exists", layer_id);
            return None;
        };
        Some((layer, &mut self.region, painter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemoryProvider;
    use crate::settings::EditorSettings;

    fn editor() -> Editor {
        let provider = MemoryProvider::new()
            .with_solid("wall", [90, 90, 90, 255])
            .with_solid("grass", [0, 255, 0, 255]);
        let settings = EditorSettings {
            default_rows: 4,
            default_cols: 4,
            ..Default::default()
        };
        let mut editor = Editor::new(settings, Box::new(provider)).unwrap();
        editor.create_layer(None).unwrap();
        editor.select_tile(Some("wall".to_string()));
        editor
    }

    fn current(editor: &Editor) -> &Layer {
        editor.document().current_layer().unwrap()
    }

    #[test]
    fn test_press_outside_grid_never_selects() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, -5, 10).unwrap();
        assert!(!editor.region().is_selecting());
        editor.pointer_pressed(PointerButton::Left, 200, 10).unwrap();
        assert!(!editor.region().is_selecting());
    }

    #[test]
    fn test_press_without_tile_or_layer_never_selects() {
        let mut editor = editor();
        editor.select_tile(None);
        editor.pointer_pressed(PointerButton::Left, 10, 10).unwrap();
        assert!(!editor.region().is_selecting());

        let mut editor = self::editor();
        let name = current(&editor).name.clone();
        editor.delete_layer(&name);
        editor.pointer_pressed(PointerButton::Left, 10, 10).unwrap();
        assert!(!editor.region().is_selecting());
    }

    #[test]
    fn test_unknown_tile_reported_on_press() {
        let mut editor = editor();
        editor.select_tile(Some("lava".to_string()));
        assert!(matches!(
            editor.pointer_pressed(PointerButton::Left, 10, 10),
            Err(EditorError::Resource(_))
        ));
        assert!(!editor.region().is_selecting());
    }

    #[test]
    fn test_drag_previews_then_commits() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, 70, 5).unwrap();
        editor.pointer_moved(5, 40).unwrap();
        assert_eq!(current(&editor).occupied_count(), 6);
        assert_eq!(
            editor.selection_rect(),
            Some(tilegrid_core::PixelRect { x: 0, y: 0, width: 96, height: 64 })
        );

        let region = editor
            .pointer_released(PointerButton::Left, 5, 40)
            .unwrap()
            .unwrap();
        assert_eq!(region, CellRegion::from_corners((0, 0), (2, 1)));
        assert_eq!(current(&editor).occupied_count(), 6);
        assert!(editor.selection_rect().is_none());
    }

    #[test]
    fn test_release_outside_grid_uses_last_cell() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        editor.pointer_moved(40, 5).unwrap();
        editor.pointer_moved(500, 5).unwrap();
        let region = editor
            .pointer_released(PointerButton::Left, 500, 5)
            .unwrap()
            .unwrap();
        assert_eq!(region, CellRegion::from_corners((0, 0), (1, 0)));
    }

    #[test]
    fn test_right_click_erases_and_is_ignored_while_selecting() {
        let mut editor = editor();
        let name = current(&editor).name.clone();
        editor.place_tile(&name, 1, 1, "grass").unwrap();
        editor.pointer_pressed(PointerButton::Right, 40, 40).unwrap();
        assert_eq!(current(&editor).get_tile(1, 1), None);

        editor.place_tile(&name, 3, 3, "grass").unwrap();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        editor.pointer_pressed(PointerButton::Right, 100, 100).unwrap();
        assert_eq!(current(&editor).get_tile(3, 3), Some("grass"));
    }

    #[test]
    fn test_zoom_cancels_drag() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        editor.pointer_moved(100, 100).unwrap();
        assert_eq!(current(&editor).occupied_count(), 16);

        assert!(editor.wheel(1.0, 100, 100).unwrap());
        assert!(!editor.region().is_selecting());
        assert_eq!(current(&editor).occupied_count(), 0);
        assert_eq!(editor.render().live_sprites(), 0);
        assert_eq!(editor.document().mapper.zoom_percent(), 110);
        assert!(!editor.wheel(0.0, 0, 0).unwrap());
    }

    #[test]
    fn test_deleting_drag_layer_drops_drag() {
        let mut editor = editor();
        let name = current(&editor).name.clone();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        editor.pointer_moved(40, 40).unwrap();
        assert!(editor.delete_layer(&name));
        assert!(!editor.region().is_selecting());
        assert_eq!(editor.render().live_sprites(), 0);
        assert!(editor.serialize().is_ok());
    }

    #[test]
    fn test_middle_drag_pans_and_moves_hover() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Middle, 10, 10).unwrap();
        editor.pointer_moved(42, 10).unwrap();
        editor.pointer_released(PointerButton::Middle, 42, 10).unwrap();
        assert_eq!(editor.document().mapper.offset(), (32, 0));

        editor.pointer_moved(40, 5).unwrap();
        assert_eq!(editor.hovered_cell(), Some((0, 0)));
        assert_eq!(editor.hover_rect().map(|r| (r.x, r.y)), Some((0, 0)));
        editor.pointer_moved(10, 5).unwrap();
        assert_eq!(editor.hovered_cell(), None);
        editor.pointer_left();
        assert_eq!(editor.hovered_cell(), None);
    }

    #[test]
    fn test_serialize_refused_during_drag() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        assert_eq!(editor.serialize(), Err(EditorError::DragInProgress));
        editor.cancel_drag().unwrap();
        assert!(editor.serialize().is_ok());
    }
}
