//! Batch grading.
//!
//! Every input runs its own full pipeline; one image failing never stops
//! the others. Results are written to `<output_dir>/<output_prefix><name>`
//! and the image dropped straight away, so memory stays flat. With the
//! `parallel` feature inputs are processed on the rayon pool, in no
//! particular order; the report keeps input order.

use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::pipeline::{GradeStatus, Pipeline, Stage};
use crate::{ColorPlan, io};

/// How one batch input ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemResult {
    /// Graded and saved.
    Graded,
    /// Saved, but the LUT stage was skipped.
    Degraded,
    /// Nothing written.
    Failed,
}

/// Per-input batch record.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Source image.
    pub input: PathBuf,
    /// Written file, if any.
    pub output: Option<PathBuf>,
    /// Outcome class.
    pub result: ItemResult,
    /// Final stage.
    pub stage: Stage,
    /// Status message.
    pub message: String,
}

/// Results of a batch run, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per input.
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn count(&self, result: ItemResult) -> usize {
        self.items.iter().filter(|i| i.result == result).count()
    }

    /// Inputs graded with every requested LUT.
    pub fn graded(&self) -> usize {
        self.count(ItemResult::Graded)
    }

    /// Inputs saved without their LUT.
    pub fn degraded(&self) -> usize {
        self.count(ItemResult::Degraded)
    }

    /// Inputs with no output.
    pub fn failed(&self) -> usize {
        self.count(ItemResult::Failed)
    }

    /// True if every input produced an output.
    pub fn all_written(&self) -> bool {
        self.failed() == 0
    }
}

impl Pipeline {
    fn batch_item(&self, input: &Path, plan: &ColorPlan) -> BatchItem {
        trace!(input = %input.display(), "batch item");
        let outcome = self.process_file(input, plan);
        let message = outcome.message();
        let stage = outcome.stage;
        let result = match outcome.status {
            GradeStatus::Success => ItemResult::Graded,
            GradeStatus::LutNotFound(_) => ItemResult::Degraded,
            GradeStatus::Failed(_) => ItemResult::Failed,
        };

        let Some(image) = outcome.image else {
            return BatchItem {
                input: input.to_path_buf(),
                output: None,
                result,
                stage,
                message,
            };
        };

        let output = self.config().output_path(input);
        match io::save_rgb(&image, &output) {
            Ok(()) => BatchItem {
                input: input.to_path_buf(),
                output: Some(output),
                result,
                stage,
                message,
            },
            Err(e) => {
                warn!(output = %output.display(), error = %e, "failed to write result");
                BatchItem {
                    input: input.to_path_buf(),
                    output: None,
                    result: ItemResult::Failed,
                    stage: Stage::Error,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Grades `inputs` with one plan and writes the results.
    pub fn process_batch<P>(&self, inputs: &[P], plan: &ColorPlan) -> BatchReport
    where
        P: AsRef<Path> + Sync,
    {
        info!(files = inputs.len(), "starting batch");

        #[cfg(feature = "parallel")]
        let items: Vec<BatchItem> = inputs
            .par_iter()
            .map(|p| self.batch_item(p.as_ref(), plan))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let items: Vec<BatchItem> = inputs
            .iter()
            .map(|p| self.batch_item(p.as_ref(), plan))
            .collect();

        let report = BatchReport { items };
        info!(
            graded = report.graded(),
            degraded = report.degraded(),
            failed = report.failed(),
            "batch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineConfig;
    use grade_lut::{Lut3D, cube};
    use image::{Rgb, RgbImage};

    #[test]
    fn mixed_batch() {
        let dir = tempfile::tempdir().unwrap();
        let luts = dir.path().join("luts");
        std::fs::create_dir_all(&luts).unwrap();
        cube::write_3d(luts.join("mono.cube"), &Lut3D::from_fn(2, |r, g, b| {
            let y = (r + g + b) / 3.0;
            [y, y, y]
        }))
        .unwrap();

        let good = dir.path().join("good.png");
        RgbImage::from_pixel(3, 3, Rgb([90, 120, 150])).save(&good).unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"nope").unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            lut_root: luts,
            output_dir: dir.path().join("out"),
            ..Default::default()
        })
        .unwrap();

        let report = pipeline.process_batch(&[good.clone(), bad.clone()], &ColorPlan::with_lut("mono"));
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].input, good);
        assert_eq!(report.items[0].result, ItemResult::Graded);
        assert_eq!(report.items[1].result, ItemResult::Failed);
        assert!(!report.all_written());

        let written = report.items[0].output.as_ref().unwrap();
        assert_eq!(written, &dir.path().join("out/graded_good.png"));
        let out = io::load_rgb(written).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [120, 120, 120]);
    }

    #[test]
    fn missing_lut_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])).save(&input).unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            lut_root: dir.path().join("no-luts"),
            output_dir: dir.path().join("out"),
            ..Default::default()
        })
        .unwrap();

        let report = pipeline.process_batch(&[input], &ColorPlan::with_lut("missing.cube"));
        assert_eq!(report.degraded(), 1);
        assert!(report.all_written());
        assert!(report.items[0].message.contains("not found"));
    }
}
