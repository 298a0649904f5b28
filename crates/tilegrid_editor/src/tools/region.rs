//! Drag-region painting with live preview
//!
//! While a drag is active, every cell the rectangle has touched is painted
//! with the drag tile and its pre-drag occupant is remembered once. Cancel
//! puts those occupants back. Commit reverts first and then fills the final
//! rectangle, so the committed cells never depend on preview sprites.

use std::collections::HashSet;
use tilegrid_core::{Layer, TileId};
use tracing::debug;
use uuid::Uuid;

use super::paint::Painter;
use crate::resources::ResourceError;

/// Axis-aligned, inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRegion {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl CellRegion {
    /// Rectangle spanned by two corners given in any order
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// An active drag: which layer, which tile, and the two corners
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub layer: Uuid,
    pub tile: TileId,
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl Drag {
    pub fn region(&self) -> CellRegion {
        CellRegion::from_corners(self.start, self.end)
    }
}

/// Region paint state machine: idle, or selecting with a preview buffer
#[derive(Debug, Default)]
pub struct RegionPaint {
    drag: Option<Drag>,
    captured: Vec<(u32, u32, Option<TileId>)>,
    recorded: HashSet<(u32, u32)>,
}

impl RegionPaint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selecting(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Current rectangle while selecting
    pub fn region(&self) -> Option<CellRegion> {
        self.drag.as_ref().map(Drag::region)
    }

    /// Pre-drag occupants of every cell the preview has touched
    pub fn captured(&self) -> &[(u32, u32, Option<TileId>)] {
        &self.captured
    }

    /// Enter selecting at `start`; the preview buffer starts empty
    ///
    /// Any previous drag must already have been committed or cancelled.
    pub fn begin(&mut self, layer: Uuid, tile: TileId, start: (u32, u32)) {
        debug_assert!(self.drag.is_none(), "region drag already active");
        self.captured.clear();
        self.recorded.clear();
        self.drag = Some(Drag {
            layer,
            tile,
            start,
            end: start,
        });
    }

    /// Record a new end corner without touching any cell
    pub fn set_end(&mut self, end: (u32, u32)) {
        if let Some(drag) = &mut self.drag {
            drag.end = end;
        }
    }

    /// Move the end corner and paint the preview over cells not yet touched
    pub fn update(
        &mut self,
        layer: &mut Layer,
        painter: &mut Painter<'_>,
        end: (u32, u32),
    ) -> Result<(), ResourceError> {
        let Some(drag) = &mut self.drag else {
            return Ok(());
        };
        drag.end = end;
        let tile = drag.tile.clone();
        for (x, y) in drag.region().cells() {
            if !self.recorded.insert((x, y)) {
                continue;
            }
            let previous = layer.get_tile(x, y).map(str::to_string);
            self.captured.push((x, y, previous));
            painter.place(layer, x, y, &tile)?;
        }
        Ok(())
    }

    /// Restore every captured cell to its pre-drag occupant with fresh sprites
    ///
    /// The drag itself stays active.
    pub fn revert(
        &mut self,
        layer: &mut Layer,
        painter: &mut Painter<'_>,
    ) -> Result<(), ResourceError> {
        let captured = std::mem::take(&mut self.captured);
        self.recorded.clear();
        for (x, y, previous) in captured {
            painter.erase(layer, x, y);
            if let Some(tile) = previous {
                painter.place(layer, x, y, &tile)?;
            }
        }
        Ok(())
    }

    /// Finish the drag: revert the preview, then fill the final rectangle
    pub fn commit(
        &mut self,
        layer: &mut Layer,
        painter: &mut Painter<'_>,
    ) -> Result<Option<CellRegion>, ResourceError> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        self.revert(layer, painter)?;
        let region = drag.region();
        for (x, y) in region.cells() {
            painter.place(layer, x, y, &drag.tile)?;
        }
        debug!(
            "Committed {}x{} region of {:?} at ({}, {})",
            region.width(),
            region.height(),
            drag.tile,
            region.min_x,
            region.min_y
        );
        Ok(Some(region))
    }

    /// Abort the drag, restoring the pre-drag contents; returns whether a drag was active
    pub fn cancel(
        &mut self,
        layer: &mut Layer,
        painter: &mut Painter<'_>,
    ) -> Result<bool, ResourceError> {
        if self.drag.take().is_none() {
            return Ok(false);
        }
        self.revert(layer, painter)?;
        debug!("Cancelled region drag");
        Ok(true)
    }

    /// Drop the drag and its buffer without touching any layer
    ///
    /// Only valid when the drag's layer and sprites are being discarded.
    pub fn reset(&mut self) {
        self.drag = None;
        self.captured.clear();
        self.recorded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderState;
    use crate::resources::{MemoryProvider, TileImageCache};
    use tilegrid_core::CoordinateMapper;

    struct Fixture {
        render: RenderState,
        tiles: TileImageCache,
        provider: MemoryProvider,
        layer: Layer,
    }

    impl Fixture {
        fn new(width: u32, height: u32) -> Self {
            Self {
                render: RenderState::new(),
                tiles: TileImageCache::new(16, 16),
                provider: MemoryProvider::new()
                    .with_solid("wall", [90, 90, 90, 255])
                    .with_solid("grass", [0, 255, 0, 255]),
                layer: Layer::new("L".to_string(), width, height),
            }
        }

        fn split(&mut self) -> (Painter<'_>, &mut Layer) {
            (
                Painter {
                    render: &mut self.render,
                    tiles: &mut self.tiles,
                    provider: &self.provider,
                    mapper: CoordinateMapper::new(16, 16),
                },
                &mut self.layer,
            )
        }
    }

    fn assert_handles_match(painter: &Painter<'_>, layer: &Layer) {
        let occupied: Vec<_> = layer.occupied_cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(painter.render.cells(layer.id), occupied);
    }

    #[test]
    fn test_region_corner_order_is_irrelevant() {
        let a = CellRegion::from_corners((3, 1), (0, 4));
        let b = CellRegion::from_corners((0, 4), (3, 1));
        assert_eq!(a, b);
        assert_eq!((a.width(), a.height()), (4, 4));
        assert_eq!((a.min_x, a.min_y, a.max_x, a.max_y), (0, 1, 3, 4));
        let cells: Vec<_> = CellRegion::from_corners((1, 0), (0, 1)).cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_commit_fills_region() {
        let mut fx = Fixture::new(2, 2);
        let (mut painter, layer) = fx.split();
        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (1, 0));
        region.update(layer, &mut painter, (0, 1)).unwrap();
        let committed = region.commit(layer, &mut painter).unwrap().unwrap();
        assert_eq!(committed, CellRegion::from_corners((0, 0), (1, 1)));
        assert!(!region.is_selecting());
        assert_eq!(layer.occupied_count(), 4);
        assert!(layer.occupied_cells().all(|(_, _, t)| t == "wall"));
        assert_handles_match(&painter, layer);
        assert_eq!(painter.render.live_sprites(), 4);
    }

    #[test]
    fn test_click_without_drag_paints_one_cell() {
        let mut fx = Fixture::new(3, 3);
        let (mut painter, layer) = fx.split();
        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (2, 2));
        region.commit(layer, &mut painter).unwrap();
        assert_eq!(layer.occupied_count(), 1);
        assert_eq!(layer.get_tile(2, 2), Some("wall"));
    }

    #[test]
    fn test_cancel_restores_pre_drag_contents() {
        let mut fx = Fixture::new(3, 3);
        let (mut painter, layer) = fx.split();
        painter.place(layer, 1, 1, "grass").unwrap();
        let before = layer.to_rows();

        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (0, 0));
        region.update(layer, &mut painter, (2, 2)).unwrap();
        assert_eq!(layer.occupied_count(), 9);
        assert_eq!(layer.get_tile(1, 1), Some("wall"));

        assert!(region.cancel(layer, &mut painter).unwrap());
        assert_eq!(layer.to_rows(), before);
        assert_handles_match(&painter, layer);
        assert_eq!(painter.render.live_sprites(), 1);
        assert!(!region.cancel(layer, &mut painter).unwrap());
    }

    #[test]
    fn test_cells_are_captured_once() {
        let mut fx = Fixture::new(3, 1);
        let (mut painter, layer) = fx.split();
        painter.place(layer, 0, 0, "grass").unwrap();

        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (0, 0));
        region.update(layer, &mut painter, (1, 0)).unwrap();
        region.update(layer, &mut painter, (0, 0)).unwrap();
        region.update(layer, &mut painter, (2, 0)).unwrap();
        assert_eq!(
            region.captured(),
            &[
                (0, 0, Some("grass".to_string())),
                (1, 0, None),
                (2, 0, None)
            ]
        );
        region.cancel(layer, &mut painter).unwrap();
        assert_eq!(layer.get_tile(0, 0), Some("grass"));
        assert_eq!(layer.occupied_count(), 1);
    }

    #[test]
    fn test_shrinking_drag_commits_final_rectangle_only() {
        let mut fx = Fixture::new(3, 3);
        let (mut painter, layer) = fx.split();
        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (0, 0));
        region.update(layer, &mut painter, (2, 2)).unwrap();
        region.update(layer, &mut painter, (1, 0)).unwrap();
        region.commit(layer, &mut painter).unwrap();
        let cells: Vec<_> = layer.occupied_cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0)]);
        assert_handles_match(&painter, layer);
    }

    #[test]
    fn test_revert_uses_fresh_sprites() {
        let mut fx = Fixture::new(2, 1);
        let (mut painter, layer) = fx.split();
        painter.place(layer, 0, 0, "grass").unwrap();
        let original = painter.render.handle(layer.id, 0, 0).unwrap();

        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (0, 0));
        region.update(layer, &mut painter, (1, 0)).unwrap();
        region.cancel(layer, &mut painter).unwrap();

        let restored = painter.render.handle(layer.id, 0, 0).unwrap();
        assert_ne!(original, restored);
        assert!(painter.render.sprite(original).is_none());
        assert_eq!(painter.render.sprite(restored).unwrap().tile, "grass");
    }

    #[test]
    fn test_commit_over_existing_tiles() {
        let mut fx = Fixture::new(2, 2);
        let (mut painter, layer) = fx.split();
        painter.place(layer, 0, 0, "grass").unwrap();
        painter.place(layer, 1, 1, "grass").unwrap();

        let mut region = RegionPaint::new();
        region.begin(layer.id, "wall".to_string(), (0, 0));
        region.update(layer, &mut painter, (1, 0)).unwrap();
        region.set_end((1, 0));
        region.commit(layer, &mut painter).unwrap();
        assert_eq!(layer.get_tile(0, 0), Some("wall"));
        assert_eq!(layer.get_tile(1, 0), Some("wall"));
        assert_eq!(layer.get_tile(1, 1), Some("grass"));
        assert_eq!(painter.render.live_sprites(), 3);
    }
}
