use thiserror::Error;

use crate::{dtype::DataType, shape::Shape, store::StoreError};

/// Errors raised by the array engine.
///
/// Every check is performed before bytes are transferred, so an error never leaves a
/// partially written window behind.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A window (count + offset) exceeds the extent of its target.
    #[error("index {index} out of bounds for extent {extent}")]
    OutOfBounds { index: Shape, extent: Shape },

    /// A linear element index is outside of a buffer.
    #[error("element index {index} out of bounds (len={len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A resize request targets a rank the host container cannot represent.
    #[error("invalid rank: {reason} (requested shape {shape})")]
    InvalidRank { reason: &'static str, shape: Shape },

    /// A data type name or physical type outside the known mapping.
    #[error("unknown data type: {name}")]
    UnknownDataType { name: String },

    /// The handle has no backing persistent object.
    #[error("no persistent array at {location}")]
    UninitializedTarget { location: String },

    /// The extent of a bounded view can never change.
    #[error("operation not permitted on a bounded view: extent is immutable")]
    ImmutableExtent,

    /// Two shapes of different rank were combined.
    #[error("shape rank mismatch: {lhs} vs {rhs}")]
    ShapeMismatch { lhs: usize, rhs: usize },

    #[error("data type mismatch: expected {expected}, got {actual}")]
    DataTypeMismatch { expected: DataType, actual: DataType },

    /// The number of buffer elements doesn't match the window.
    #[error("wrong element count: expected {expected}, got {actual}")]
    WrongElementCount { expected: usize, actual: usize },

    /// Attempted to use an API that only supports fixed-width types.
    #[error("unsupported for variable-width types")]
    UnsupportedVariableWidth,

    /// Host `ndarray` values must be in standard layout (contiguous, row-major).
    #[error("ndarray is not standard layout")]
    NonContiguousNdarray,

    /// `product(shape) * width` overflowed `usize`.
    #[error("shape element count overflow")]
    ShapeOverflow,

    #[error("selection is empty")]
    EmptySelection,

    #[error(transparent)]
    Store(#[from] StoreError),
}
