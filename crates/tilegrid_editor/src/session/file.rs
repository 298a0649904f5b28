//! Opening and saving map files

use std::path::Path;
use tilegrid_core::MapFile;

use super::Editor;
use crate::EditorError;

impl Editor {
    /// Load a map file and make it the current document
    pub fn open(&mut self, path: &Path) -> Result<(), EditorError> {
        let file = MapFile::load(path)?;
        self.deserialize(file)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Save the map to a new path, which becomes the current path
    pub fn save_as(&mut self, path: &Path) -> Result<(), EditorError> {
        self.serialize()?.save(path, self.settings.save_indent)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Save the map to the path it was opened from or last saved to
    pub fn save_current(&mut self) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NoPath)?;
        self.save_as(&path)
    }
}
