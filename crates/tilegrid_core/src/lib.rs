//! Core data structures for tilegrid
//!
//! This crate provides the fundamental types for a layered tile map:
//! - `MapDocument` - Grid dimensions, view state and the ordered layer store
//! - `Layer` - A named grid of optional tile ids
//! - `CoordinateMapper` - Zoom-aware pixel/grid conversion
//! - `MapFile` - The persisted JSON format consumed by external renderers

mod coords;
mod document;
mod error;
mod format;
mod layer;

pub use coords::{CoordinateMapper, PixelRect, DEFAULT_MIN_ZOOM, ZOOM_STEP};
pub use document::{LayerDirection, MapDocument, DEFAULT_LAYER_PREFIX};
pub use error::MapError;
pub use format::{LayerRecord, LoadOptions, MapFile, DEFAULT_INDENT};
pub use layer::{Layer, TileId};
