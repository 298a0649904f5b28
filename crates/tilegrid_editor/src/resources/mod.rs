//! Tile image resolution and the scaled tile cache
//!
//! A `ResourceProvider` turns a tile id into pixels at a requested size. The
//! `TileImageCache` keeps one copy of every resolved tile at the current
//! effective cell size; a zoom change asks the provider for fresh copies.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// The provider could not resolve a tile id to pixel data
    #[error("unknown asset {id:?}: {reason}")]
    UnknownAsset { id: String, reason: String },
}

/// Resolves tile ids to pixel data
pub trait ResourceProvider {
    /// Load the full-size source image for a tile id
    fn load(&self, id: &str) -> Result<RgbaImage, ResourceError>;

    /// Load a tile scaled to exactly `width x height`
    fn load_sized(&self, id: &str, width: u32, height: u32) -> Result<RgbaImage, ResourceError> {
        let source = self.load(id)?;
        Ok(resize_tile(&source, width, height))
    }
}

/// Scale a tile image to the target cell size (nearest-neighbor, pixel art stays crisp)
pub fn resize_tile(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if source.dimensions() == (width, height) {
        return source.clone();
    }
    imageops::resize(source, width.max(1), height.max(1), FilterType::Nearest)
}

/// Loads tiles as image files named by their id under a resource directory
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a tile id resolves to
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl ResourceProvider for DirectoryProvider {
    fn load(&self, id: &str) -> Result<RgbaImage, ResourceError> {
        let path = self.path_for(id);
        let image = image::open(&path).map_err(|e| ResourceError::UnknownAsset {
            id: id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(image.to_rgba8())
    }
}

/// In-memory provider, for tests and hosts that generate tiles procedurally
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    images: HashMap<String, RgbaImage>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, image: RgbaImage) {
        self.images.insert(id.into(), image);
    }

    /// Register an 8x8 tile filled with one color
    pub fn with_solid(mut self, id: impl Into<String>, color: [u8; 4]) -> Self {
        self.insert(id, RgbaImage::from_pixel(8, 8, Rgba(color)));
        self
    }
}

impl ResourceProvider for MemoryProvider {
    fn load(&self, id: &str) -> Result<RgbaImage, ResourceError> {
        self.images
            .get(id)
            .cloned()
            .ok_or_else(|| ResourceError::UnknownAsset {
                id: id.to_string(),
                reason: "not registered".to_string(),
            })
    }
}

/// Process-wide cache of tile images keyed by tile id, scaled to one cell size
pub struct TileImageCache {
    cell_size: (u32, u32),
    entries: HashMap<String, Arc<RgbaImage>>,
}

impl TileImageCache {
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_size: (cell_width.max(1), cell_height.max(1)),
            entries: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> (u32, u32) {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Scaled image for an already cached tile
    pub fn get(&self, id: &str) -> Option<Arc<RgbaImage>> {
        self.entries.get(id).cloned()
    }

    /// Scaled image for a tile, resolving it through the provider on first use
    pub fn get_or_load(
        &mut self,
        id: &str,
        provider: &dyn ResourceProvider,
    ) -> Result<Arc<RgbaImage>, ResourceError> {
        if let Some(image) = self.entries.get(id) {
            return Ok(image.clone());
        }
        let (width, height) = self.cell_size;
        let image = Arc::new(provider.load_sized(id, width, height)?);
        debug!("Cached tile {:?} at {}x{}", id, width, height);
        self.entries.insert(id.to_string(), image.clone());
        Ok(image)
    }

    /// Change the target cell size, reloading every entry at the new size
    ///
    /// On failure the cache keeps its previous size and images.
    pub fn set_cell_size(
        &mut self,
        cell_width: u32,
        cell_height: u32,
        provider: &dyn ResourceProvider,
    ) -> Result<(), ResourceError> {
        let size = (cell_width.max(1), cell_height.max(1));
        if size == self.cell_size {
            return Ok(());
        }
        let mut entries = HashMap::with_capacity(self.entries.len());
        for id in self.entries.keys() {
            let image = provider.load_sized(id, size.0, size.1)?;
            entries.insert(id.clone(), Arc::new(image));
        }
        self.entries = entries;
        self.cell_size = size;
        debug!("Rescaled {} cached tiles to {}x{}", self.entries.len(), size.0, size.1);
        Ok(())
    }

    /// Change the target cell size and drop every entry
    pub fn reset(&mut self, cell_width: u32, cell_height: u32) {
        self.cell_size = (cell_width.max(1), cell_height.max(1));
        self.entries.clear();
    }
}
