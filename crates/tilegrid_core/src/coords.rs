//! Pixel/grid coordinate mapping and zoom state

/// Zoom change applied per wheel notch
pub const ZOOM_STEP: f64 = 0.1;

/// Smallest zoom level reachable by stepping
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// An axis-aligned pixel rectangle in map space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Converts between viewport pixels and grid cells
///
/// Owns the zoom level and the pan offset. The effective cell size is derived
/// from the base size on every call so it can never drift from the zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    base_width: u32,
    base_height: u32,
    zoom: f64,
    min_zoom: f64,
    offset_x: i32,
    offset_y: i32,
}

impl CoordinateMapper {
    /// Create a mapper at zoom 1.0 with no pan offset
    pub fn new(base_width: u32, base_height: u32) -> Self {
        Self {
            base_width: base_width.max(1),
            base_height: base_height.max(1),
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Set the zoom level verbatim (used when restoring a saved map)
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self
    }

    /// Base (zoom 1.0) cell size in pixels
    pub fn base_size(&self) -> (u32, u32) {
        (self.base_width, self.base_height)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Zoom level as a rounded percentage, for status display
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round().max(0.0) as u32
    }

    /// Effective cell size: `round(base * zoom)`, never below 1 pixel
    pub fn cell_size(&self) -> (u32, u32) {
        (scale(self.base_width, self.zoom), scale(self.base_height, self.zoom))
    }

    /// Step the zoom level by `delta`, clamped at the minimum zoom
    ///
    /// Returns whether the zoom level changed.
    pub fn set_zoom(&mut self, delta: f64) -> bool {
        let zoom = (self.zoom + delta).max(self.min_zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Shift the view by a pixel delta (middle-button drag)
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.offset_x = self.offset_x.saturating_add(dx);
        self.offset_y = self.offset_y.saturating_add(dy);
    }

    /// Position the view so a `rows x cols` map sits centered in the canvas
    pub fn center_in(&mut self, canvas_width: u32, canvas_height: u32, rows: u32, cols: u32) {
        let (width, height) = self.map_extent(rows, cols);
        self.offset_x = (to_pixel(canvas_width).saturating_sub(to_pixel(width))).div_euclid(2);
        self.offset_y = (to_pixel(canvas_height).saturating_sub(to_pixel(height))).div_euclid(2);
    }

    /// Convert a viewport pixel to a grid cell by floor division
    ///
    /// The result may lie outside the map; check it with `MapDocument::is_in_bounds`.
    pub fn to_grid_cell(&self, pixel_x: i32, pixel_y: i32) -> (i32, i32) {
        let (cell_width, cell_height) = self.cell_size();
        (
            pixel_x
                .saturating_sub(self.offset_x)
                .div_euclid(to_pixel(cell_width)),
            pixel_y
                .saturating_sub(self.offset_y)
                .div_euclid(to_pixel(cell_height)),
        )
    }

    /// Map-space rectangle covered by a cell
    pub fn cell_rect(&self, x: u32, y: u32) -> PixelRect {
        self.region_rect((x, y), (x, y))
    }

    /// Map-space rectangle covering the inclusive cell range `min..=max`
    ///
    /// Coordinates saturate rather than wrap at extreme zoom levels.
    pub fn region_rect(&self, min: (u32, u32), max: (u32, u32)) -> PixelRect {
        let (cell_width, cell_height) = self.cell_size();
        PixelRect {
            x: to_pixel(min.0.saturating_mul(cell_width)),
            y: to_pixel(min.1.saturating_mul(cell_height)),
            width: (max.0 - min.0 + 1).saturating_mul(cell_width),
            height: (max.1 - min.1 + 1).saturating_mul(cell_height),
        }
    }

    /// Pixel size of the whole map at the current zoom
    pub fn map_extent(&self, rows: u32, cols: u32) -> (u32, u32) {
        let (cell_width, cell_height) = self.cell_size();
        (cols.saturating_mul(cell_width), rows.saturating_mul(cell_height))
    }
}

/// Clamp a pixel length into signed pixel space
pub(crate) fn to_pixel(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn scale(base: u32, zoom: f64) -> u32 {
    let size = (base as f64 * zoom).round();
    if size.is_finite() && size >= 1.0 {
        // Cell sizes must stay representable as signed pixel distances
        size.min(i32::MAX as f64) as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_zoom_steps_from_base_32() {
        let mut mapper = CoordinateMapper::new(32, 32);
        assert!(mapper.set_zoom(ZOOM_STEP));
        assert!(mapper.set_zoom(ZOOM_STEP));
        assert_eq!(mapper.cell_size(), (38, 38));
        assert_eq!(mapper.zoom_percent(), 120);
    }

    #[test]
    fn test_zoom_out_is_clamped() {
        let mut mapper = CoordinateMapper::new(4, 4);
        for _ in 0..50 {
            mapper.set_zoom(-ZOOM_STEP);
        }
        assert!(mapper.zoom() >= DEFAULT_MIN_ZOOM);
        assert!(!mapper.set_zoom(-ZOOM_STEP));
        // 4 * 0.1 rounds to 0, clamped to a single pixel
        assert_eq!(mapper.cell_size(), (1, 1));
    }

    #[test]
    fn test_restored_zoom_never_yields_zero_cells() {
        let mapper = CoordinateMapper::new(32, 16).with_zoom(0.0);
        assert_eq!(mapper.cell_size(), (1, 1));
        let (x, y) = mapper.to_grid_cell(5, 7);
        assert_eq!((x, y), (5, 7));
    }

    #[test]
    fn test_to_grid_cell_floors() {
        let mapper = CoordinateMapper::new(32, 32);
        assert_eq!(mapper.to_grid_cell(0, 0), (0, 0));
        assert_eq!(mapper.to_grid_cell(31, 31), (0, 0));
        assert_eq!(mapper.to_grid_cell(32, 63), (1, 1));
        assert_eq!(mapper.to_grid_cell(-1, -33), (-1, -2));
    }

    #[test]
    fn test_to_grid_cell_respects_offset() {
        let mut mapper = CoordinateMapper::new(10, 10);
        mapper.pan(100, 50);
        assert_eq!(mapper.to_grid_cell(100, 50), (0, 0));
        assert_eq!(mapper.to_grid_cell(99, 50), (-1, 0));
        assert_eq!(mapper.to_grid_cell(125, 71), (2, 2));
    }

    #[test]
    fn test_center_in_canvas() {
        let mut mapper = CoordinateMapper::new(32, 32);
        mapper.center_in(800, 600, 10, 10);
        assert_eq!(mapper.offset(), (240, 140));
        mapper.center_in(100, 100, 10, 10);
        assert_eq!(mapper.offset(), (-110, -110));
    }

    #[test]
    fn test_region_rect_spans_cells() {
        let mapper = CoordinateMapper::new(16, 8);
        assert_eq!(
            mapper.region_rect((1, 2), (3, 2)),
            PixelRect {
                x: 16,
                y: 16,
                width: 48,
                height: 8
            }
        );
        assert_eq!(mapper.map_extent(4, 5), (80, 32));
    }

    #[test]
    fn test_extreme_zoom_saturates() {
        let mut mapper = CoordinateMapper::new(32, 32).with_zoom(1e12);
        let (cell_width, _) = mapper.cell_size();
        assert_eq!(cell_width, i32::MAX as u32);
        let rect = mapper.cell_rect(5, 5);
        assert_eq!((rect.x, rect.y), (i32::MAX, i32::MAX));
        assert_eq!(rect.width, i32::MAX as u32);
        assert_eq!(mapper.map_extent(100, 100), (u32::MAX, u32::MAX));
        assert_eq!(mapper.to_grid_cell(i32::MAX, 0), (1, 0));
        mapper.center_in(800, 600, 100, 100);
        mapper.pan(i32::MIN, i32::MIN);
        assert_eq!(mapper.offset(), (i32::MIN, i32::MIN));
        assert_eq!(mapper.to_grid_cell(0, 0), (1, 1));
    }
}
