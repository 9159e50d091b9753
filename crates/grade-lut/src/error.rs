//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur during LUT operations.
#[derive(Debug, Error)]
pub enum LutError {
    /// Invalid LUT size.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// Parse error when loading LUT files.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A grid sample lies outside the unit cube.
    #[error("sample {index} out of range: [{r}, {g}, {b}]")]
    OutOfRange {
        /// Zero-based sample index in file order
        index: usize,
        /// Red component
        r: f32,
        /// Green component
        g: f32,
        /// Blue component
        b: f32,
    },

    /// Name could not be resolved against the catalog.
    #[error("LUT not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LutError {
    /// True when the error means "the file is there but unusable".
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, LutError::NotFound(_))
    }
}
