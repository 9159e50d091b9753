//! # grade-ops
//!
//! Pixel operations for photo grading on 8-bit RGB images.
//!
//! # Modules
//!
//! - [`tone`] - Log simulation, brightness, white balance, contrast, saturation
//! - [`tone_curve`] - Monotone spline curves and named presets
//! - [`lut`] - 3D LUT application
//! - [`composite`] - Mixing two images
//! - [`filter`] - Convolution and sharpening
//! - [`analyze`] - Image statistics and log/standard classification
//! - [`safety`] - Name-based LUT safety filter
//!
//! # Example
//!
//! ```rust,ignore
//! use grade_ops::{ToneSettings, analyze, safety};
//!
//! let (class, _) = analyze::classify(&image);
//! let usable = safety::filter(&candidates, class);
//!
//! let settings = ToneSettings { brightness: 1.1, saturation: 1.2, ..Default::default() };
//! settings.apply(&mut image);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod analyze;
pub mod composite;
pub mod filter;
pub mod lut;
pub mod pixel;
pub mod safety;
pub mod tone;
pub mod tone_curve;

pub use analyze::{ImageClass, ImageStats};
pub use error::{OpsError, OpsResult};
pub use tone::{ToneReport, ToneSettings, ToneStep};
pub use tone_curve::{ControlPoint, CurvePreset, ToneCurve};
