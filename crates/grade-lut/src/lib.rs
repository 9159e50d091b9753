//! # grade-lut
//!
//! 3D lookup tables for photo grading: the in-memory [`Lut3D`], the
//! `.cube` reader/writer, a filename [`LutCatalog`] with exact and fuzzy
//! resolution, and the bounded [`LutCache`] of parsed tables.
//!
//! # Usage
//!
//! ```rust
//! use grade_lut::Lut3D;
//!
//! let lut = Lut3D::identity(33).unwrap();
//! let rgb = lut.apply([0.5, 0.3, 0.2]);
//! assert!((rgb[1] - 0.3).abs() < 1e-5);
//! ```
//!
//! # Interpolation
//!
//! - Trilinear (default)
//! - Tetrahedral
//!
//! # Used By
//!
//! - `grade-pipeline` - LUT stage and catalog queries
//! - `grade-cli` - `luts` subcommands

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod interp;
mod lut3d;
pub mod cache;
pub mod catalog;
pub mod cube;
pub mod fuzzy;

pub use cache::{CacheStats, LutCache};
pub use catalog::{LutCatalog, MatchKind, ResolvedLut};
pub use error::{LutError, LutResult};
pub use interp::Interpolation;
pub use lut3d::Lut3D;
pub use cube::{read_3d as read_cube_3d, write_3d as write_cube_3d};
