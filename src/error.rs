//! Error types for tile stack operations

use crate::types::{Axis, Label, TileShape};
use thiserror::Error;

/// Main error type for stack operations
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Label {label} not found on axis {axis}")]
    LabelNotFound { axis: Axis, label: Label },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error(
        "Inconsistent tile shape for (round={round}, ch={ch}, zplane={zplane}): expected {expected}, got {actual}"
    )]
    InconsistentShape {
        round: Label,
        ch: Label,
        zplane: Label,
        expected: TileShape,
        actual: TileShape,
    },

    #[error("Duplicate tile for (round={round}, ch={ch}, zplane={zplane})")]
    DuplicateTriple { round: Label, ch: Label, zplane: Label },

    #[error("Missing tile for (round={round}, ch={ch}, zplane={zplane})")]
    MissingTile { round: Label, ch: Label, zplane: Label },

    #[error("Inconsistent labels on axis {axis}: {reason}")]
    InconsistentLabels { axis: Axis, reason: String },

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Selector does not address a single tile: {0}")]
    IncompleteSelector(String),

    #[error("Invalid tile data: {0}")]
    InvalidTileData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Specialized Result type for stack operations
pub type Result<T> = std::result::Result<T, StackError>;

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}

impl StackError {
    pub(crate) fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        StackError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
