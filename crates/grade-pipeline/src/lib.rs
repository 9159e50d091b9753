//! # grade-pipeline
//!
//! Turns a [`ColorPlan`] and a source image into a graded image.
//!
//! A [`Pipeline`] owns the LUT catalog, the parsed-LUT cache and usage
//! counters, and runs each image through the tone stage, the LUT stage
//! and sharpening. Failures are reported per image, never raised.
//!
//! ```rust,ignore
//! use grade_pipeline::{ColorPlan, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::load("grade.yaml")?)?;
//! let plan = ColorPlan::from_json_str(r#"{"selected_lut": "Portra.cube", "intensity": 0.8}"#)?;
//! let (image, status) = pipeline.process_file("beach.jpg", &plan).into_pair();
//! ```

#![warn(missing_docs)]

mod error;
pub mod batch;
pub mod config;
pub mod io;
pub mod lut_stage;
pub mod pipeline;
pub mod plan;
pub mod usage;

pub use batch::{BatchItem, BatchReport, ItemResult};
pub use config::PipelineConfig;
pub use error::{GradeError, GradeResult};
pub use pipeline::{Candidates, GradeOutcome, GradeStatus, Pipeline, Stage};
pub use plan::{ColorPlan, CurveSpec};
pub use usage::UsageHistory;
