//! Error types for the grading pipeline.

use std::path::PathBuf;

use grade_lut::LutError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type GradeResult<T> = Result<T, GradeError>;

/// Errors surfaced by the grading pipeline.
///
/// `NotFound`, `CorruptLut` and `InvalidPlan` are recoverable per image;
/// `ImageIo` on the source image ends processing of that image.
#[derive(Debug, Error)]
pub enum GradeError {
    /// LUT name could not be resolved, fuzzy matching included.
    #[error("LUT not found: {0}")]
    NotFound(String),

    /// LUT file exists but cannot be parsed.
    #[error("corrupt LUT {path}: {reason}")]
    CorruptLut {
        /// Resolved file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Plan values out of range or malformed.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Source image missing or undecodable, or output not writable.
    #[error("image I/O error for {path}: {reason}")]
    ImageIo {
        /// Image path.
        path: PathBuf,
        /// Decoder or filesystem message.
        reason: String,
    },

    /// Config file not found.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Config value not understood.
    #[error("invalid config: {0}")]
    Config(String),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradeError {
    /// Wraps a LUT failure on a resolved path.
    pub fn lut(path: impl Into<PathBuf>, err: LutError) -> Self {
        match err {
            LutError::NotFound(name) => GradeError::NotFound(name),
            other => GradeError::CorruptLut {
                path: path.into(),
                reason: other.to_string(),
            },
        }
    }

    /// Wraps an image decode/encode failure.
    pub fn image_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        GradeError::ImageIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that end processing of the current image.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GradeError::ImageIo { .. } | GradeError::CorruptLut { .. })
    }
}

impl From<LutError> for GradeError {
    fn from(err: LutError) -> Self {
        GradeError::lut(PathBuf::new(), err)
    }
}
