//! tilegrid_editor - Headless tile map editing engine
//!
//! This crate drives a `tilegrid_core::MapDocument` from host input:
//! - Single-cell placement and erasure with one sprite per occupied cell
//! - Drag-region painting with live preview, commit and exact rollback
//! - Zoom, panning and hover/selection overlays
//! - Layer management and keyboard shortcuts
//! - Map file open/save and persisted editor settings
//!
//! The host shell owns the window. It forwards pointer, wheel and key events
//! to an [`Editor`] and draws what [`Editor::draw_list`] and the overlay
//! accessors return.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tilegrid_editor::{Editor, EditorSettings, PointerButton};
//!
//! let mut editor = Editor::from_settings(EditorSettings::load())?;
//! editor.create_layer(None)?;
//! editor.select_tile(Some("grass.png".to_string()));
//! editor.pointer_pressed(PointerButton::Left, 40, 40)?;
//! editor.pointer_moved(120, 90)?;
//! editor.pointer_released(PointerButton::Left, 120, 90)?;
//! editor.save_as("level1.json".as_ref())?;
//! ```

pub mod commands;
pub mod render;
pub mod resources;
pub mod session;
pub mod settings;
pub mod tools;

pub use tilegrid_core;

pub use commands::{EditorAction, Key, Modifiers};
pub use render::{GridLine, RenderState, Sprite, SpriteHandle};
pub use resources::{DirectoryProvider, MemoryProvider, ResourceError, ResourceProvider, TileImageCache};
pub use session::{Editor, StatusLine};
pub use settings::{EditorSettings, SettingsError};
pub use tools::{CellRegion, PointerButton};

use thiserror::Error;
use tilegrid_core::MapError;

/// Errors surfaced by editor operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// Save to the current path was requested but the map was never saved or opened
    #[error("No file path set for the current map")]
    NoPath,
    #[error("Cannot serialize while a region drag is in progress")]
    DragInProgress,
}
