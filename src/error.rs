use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("character ramp has no glyphs")]
    EmptyRamp,

    #[error("grid would be {width}x{height} cells")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid is {found:?} but {expected:?} was expected")]
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("no cached grid at index {index} (cache holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("pixel buffer holds {found} bytes, {width}x{height} RGBA needs {expected}")]
    BufferLength {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
