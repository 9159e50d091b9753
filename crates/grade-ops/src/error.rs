//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Tone-curve control points are unusable.
    #[error("invalid curve: {0}")]
    InvalidCurve(String),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
