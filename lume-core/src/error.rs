use thiserror::Error;

use crate::array::ArrayKind;
use crate::mesh::{Binding, Channel};
use crate::primitive::Mode;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LumeError {
    #[error("can't convert {channel} from {binding:?} to PerVertex for {mode:?} primitives")]
    UnsupportedBindingConversion {
        channel: Channel,
        mode: Mode,
        binding: Binding,
    },
    #[error("{channel} bound {binding:?} has {actual} elements, expected {expected}")]
    AttributeLengthMismatch {
        channel: Channel,
        binding: Binding,
        expected: usize,
        actual: usize,
    },
    #[error("mesh has no position array")]
    MissingPositions,
    #[error("position array must be bound PerVertex, found {0:?}")]
    InvalidPositionBinding(Binding),
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("can't split mesh: {reason}")]
    UnsplittableMesh { reason: String },
    #[error("index bound {0} is too small to hold a triangle")]
    InvalidIndexBound(u32),
    #[error("split did not converge after {iterations} passes")]
    SplitDidNotConverge { iterations: usize },
    #[error("triangle strip generation failed: {reason}")]
    StripGenerationFailed { reason: String },
    #[error("tangent space generation failed for mesh '{mesh}': {reason}")]
    TangentGenerationFailed { mesh: String, reason: String },
    #[error("array kind mismatch: expected {expected:?}, found {actual:?}")]
    ArrayKindMismatch {
        expected: ArrayKind,
        actual: ArrayKind,
    },
}

pub type LumeResult<T> = Result<T, LumeError>;
