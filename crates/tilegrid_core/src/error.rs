//! Error types for document editing and map file I/O

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Cell coordinate outside the document grid
    #[error("cell ({x}, {y}) is outside the map")]
    OutOfBounds { x: i64, y: i64 },
    /// Input is missing required fields or has inconsistent grid dimensions
    #[error("malformed map document: {0}")]
    MalformedDocument(String),
    #[error("a layer named {0:?} already exists")]
    DuplicateLayerName(String),
    #[error("no layer named {0:?}")]
    UnknownLayer(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

impl MapError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        MapError::MalformedDocument(msg.into())
    }
}
