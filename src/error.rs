use thiserror::Error;

use crate::volume::Extents;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("channel extents differ: red {red}, green {green}, blue {blue}")]
    ShapeMismatch {
        red: Extents,
        green: Extents,
        blue: Extents,
    },

    #[error("sample buffer length {len} does not match extents {extents}")]
    DimensionMismatch { len: usize, extents: Extents },

    #[error("{name} must be between 1 and {max}, got {value}")]
    InvalidBitDepth {
        name: &'static str,
        value: u32,
        max: u32,
    },

    #[error("expected 2-D points and vertices, got {point_dims}-D points and {vertex_dims}-D vertices")]
    InvalidShape {
        point_dims: usize,
        vertex_dims: usize,
    },

    #[error("flat coordinate buffer of length {len} is not a multiple of {dims}")]
    RaggedCoordinates { len: usize, dims: usize },

    #[error("could not allocate {entries} entries")]
    OutOfMemory { entries: usize },
}
