use thiserror::Error;

use crate::model::{ClipId, TrackId};

#[derive(Debug, Error)]
pub enum ArrangerError {
    #[error("Engine error: {0}")]
    Engine(String),
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),
    #[error("Track {0} not found")]
    TrackNotFound(TrackId),
    #[error("Clip {0} not found")]
    ClipNotFound(ClipId),
    #[error("Invalid edit: {0}")]
    InvalidEdit(#[from] EditError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("File error: {0}")]
    File(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArrangerError>;

/// Reasons a pure edit refuses to produce a result. Callers treat these as
/// silently ignored edits.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EditError {
    #[error("split point {0} is not strictly inside the clip")]
    InvalidSplitPoint(f64),
    #[error("edit leaves the clip out of bounds")]
    OutOfBounds,
    #[error("operation does not apply to this clip kind")]
    WrongClipKind,
}

// Conversion helpers
impl From<serde_json::Error> for ArrangerError {
    fn from(err: serde_json::Error) -> Self {
        ArrangerError::Config(err.to_string())
    }
}

impl From<anyhow::Error> for ArrangerError {
    fn from(err: anyhow::Error) -> Self {
        ArrangerError::Engine(err.to_string())
    }
}
