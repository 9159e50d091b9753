//! Per-image grading orchestrator.
//!
//! Each image moves through a fixed sequence of stages:
//!
//! ```text
//! Loaded -> ToneAdjusted -> LutApplied -> Sharpened -> Done
//!    \            \              \             \
//!     +------------+--------------+-------------+--> Error
//! ```
//!
//! Failures never escape [`Pipeline::process_image`] or
//! [`Pipeline::process_file`]; they come back as an outcome with no image
//! and a reason. A LUT that cannot be resolved is not a failure: the
//! tone-adjusted image is returned with a "not found" status.

use std::fmt;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use grade_lut::{Interpolation, LutCache, LutCatalog, ResolvedLut};
use grade_ops::{ImageClass, ToneReport, analyze, filter, safety};
use image::RgbImage;
use tracing::{debug, info, trace, warn};

use crate::lut_stage::{AppliedLut, LutOutcome, LutRequest, LutStage};
use crate::{ColorPlan, GradeError, GradeResult, PipelineConfig, UsageHistory, io};

/// Processing stage of a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Source decoded.
    Loaded,
    /// Tone/color stage done.
    ToneAdjusted,
    /// LUT stage done (possibly skipped for a missing LUT).
    LutApplied,
    /// Sharpening done.
    Sharpened,
    /// Finished successfully.
    Done,
    /// Terminal failure.
    Error,
}

impl Stage {
    /// The stage that must follow this one on success.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Loaded => Some(Stage::ToneAdjusted),
            Stage::ToneAdjusted => Some(Stage::LutApplied),
            Stage::LutApplied => Some(Stage::Sharpened),
            Stage::Sharpened => Some(Stage::Done),
            Stage::Done | Stage::Error => None,
        }
    }

    /// True for `Done` and `Error`.
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Loaded => "loaded",
            Stage::ToneAdjusted => "tone-adjusted",
            Stage::LutApplied => "lut-applied",
            Stage::Sharpened => "sharpened",
            Stage::Done => "done",
            Stage::Error => "error",
        };
        f.write_str(s)
    }
}

/// Walks the stage sequence in order.
#[derive(Debug)]
struct StageTracker {
    current: Stage,
}

impl StageTracker {
    fn start() -> Self {
        Self {
            current: Stage::Loaded,
        }
    }

    fn advance(&mut self) -> Stage {
        if let Some(next) = self.current.next() {
            trace!(from = %self.current, to = %next, "stage");
            self.current = next;
        }
        self.current
    }
}

/// How processing of an image ended.
#[derive(Debug)]
pub enum GradeStatus {
    /// All requested work done.
    Success,
    /// The primary LUT could not be resolved; the LUT stage was skipped.
    LutNotFound(String),
    /// Processing stopped.
    Failed(GradeError),
}

impl fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeStatus::Success => f.write_str("success"),
            GradeStatus::LutNotFound(name) => write!(f, "LUT not found: {name}"),
            GradeStatus::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// Result of grading one image.
#[derive(Debug)]
pub struct GradeOutcome {
    /// Graded image; `None` on failure.
    pub image: Option<RgbImage>,
    /// Final status.
    pub status: GradeStatus,
    /// `Done` or `Error`.
    pub stage: Stage,
    /// Last stage completed before finishing or failing.
    pub last_completed: Stage,
    /// Tone-stage report.
    pub tone: ToneReport,
    /// Primary LUT, when applied.
    pub primary: Option<AppliedLut>,
    /// Secondary LUT, when mixed in.
    pub secondary: Option<AppliedLut>,
    /// Degradations collected along the way.
    pub warnings: Vec<String>,
}

impl GradeOutcome {
    fn failed(last_completed: Stage, err: GradeError, tone: ToneReport, warnings: Vec<String>) -> Self {
        warn!(stage = %last_completed, error = %err, "grading failed");
        Self {
            image: None,
            status: GradeStatus::Failed(err),
            stage: Stage::Error,
            last_completed,
            tone,
            primary: None,
            secondary: None,
            warnings,
        }
    }

    /// True if an image was produced.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// True for [`GradeStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self.status, GradeStatus::Success)
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        match (&self.status, &self.primary) {
            (GradeStatus::Success, Some(lut)) => format!(
                "success: applied {}",
                lut.path.file_name().unwrap_or(lut.path.as_os_str()).to_string_lossy()
            ),
            (status, _) => status.to_string(),
        }
    }

    /// `(image, status message)`.
    pub fn into_pair(self) -> (Option<RgbImage>, String) {
        let message = self.message();
        (self.image, message)
    }
}

/// Safe LUT candidates for an image.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates<S> {
    /// At least one candidate survived the safety filter.
    Available(Vec<S>),
    /// Every candidate was rejected: no safe LUT available.
    Exhausted {
        /// Candidates removed by the filter.
        rejected: Vec<S>,
    },
}

impl<S> Candidates<S> {
    /// Surviving names; empty when exhausted.
    pub fn names(&self) -> &[S] {
        match self {
            Candidates::Available(names) => names,
            Candidates::Exhausted { .. } => &[],
        }
    }

    /// True when nothing survived.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Candidates::Exhausted { .. })
    }
}

/// Grading pipeline owning the LUT catalog, parsed-LUT cache and usage
/// counters. Shareable across threads.
pub struct Pipeline {
    config: PipelineConfig,
    catalog: RwLock<LutCatalog>,
    cache: LutCache,
    usage: UsageHistory,
}

impl Pipeline {
    /// Validates `config` and indexes its LUT directory.
    pub fn new(config: PipelineConfig) -> GradeResult<Self> {
        config.validate()?;
        let interpolation: Interpolation = config.interpolation()?;

        let mut catalog = LutCatalog::new(&config.lut_root)
            .with_extension(&config.lut_extension)
            .with_cutoff(config.fuzzy_cutoff);
        let count = catalog.build_index();
        info!(root = %config.lut_root.display(), count, "LUT catalog ready");

        let cache = LutCache::new(config.cache_capacity).with_interpolation(interpolation);

        Ok(Self {
            config,
            catalog: RwLock::new(catalog),
            cache,
            usage: UsageHistory::new(),
        })
    }

    /// Pipeline with default settings over `lut_root`.
    pub fn open(lut_root: impl AsRef<Path>) -> GradeResult<Self> {
        Self::new(PipelineConfig {
            lut_root: lut_root.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read access to the catalog.
    pub fn catalog(&self) -> RwLockReadGuard<'_, LutCatalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The parsed-LUT cache.
    pub fn cache(&self) -> &LutCache {
        &self.cache
    }

    /// Usage counters.
    pub fn usage(&self) -> &UsageHistory {
        &self.usage
    }

    /// Rebuilds the catalog from disk and drops cached LUTs.
    pub fn reindex(&self) -> usize {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let count = catalog.build_index();
        self.cache.clear();
        info!(count, "LUT catalog rebuilt");
        count
    }

    /// Resolves a LUT name or path through the catalog.
    pub fn resolve(&self, name_or_path: &str) -> GradeResult<ResolvedLut> {
        Ok(self.catalog().resolve(name_or_path)?)
    }

    /// Every indexed LUT name.
    pub fn list_names(&self) -> Vec<String> {
        self.catalog().list_names()
    }

    /// Classifies an image with the configured threshold.
    pub fn classify(&self, image: &RgbImage) -> (ImageClass, f32) {
        analyze::classify_with_threshold(image, self.config.log_threshold)
    }

    /// Classifies an image file; unreadable files count as standard.
    pub fn classify_file(&self, path: impl AsRef<Path>) -> (ImageClass, f32) {
        let path = path.as_ref();
        match io::load_rgb(path) {
            Ok(image) => self.classify(&image),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "image analysis failed, assuming standard");
                (ImageClass::Standard, 0.0)
            }
        }
    }

    /// Classifies `image` and filters `names` for it.
    pub fn safe_candidates<S: AsRef<str> + Clone>(
        &self,
        image: &RgbImage,
        names: &[S],
    ) -> Candidates<S> {
        let (class, stddev) = self.classify(image);
        let (safe, rejected) = safety::partition(names, class);
        debug!(%class, stddev, kept = safe.len(), rejected = rejected.len(), "candidate filter");
        if safe.is_empty() && !names.is_empty() {
            warn!(%class, "no safe LUT available");
            Candidates::Exhausted { rejected }
        } else {
            Candidates::Available(safe)
        }
    }

    /// Grades an image already in memory.
    pub fn process_image(&self, mut image: RgbImage, plan: &ColorPlan) -> GradeOutcome {
        let mut stages = StageTracker::start();
        let mut plan = plan.clone();
        let mut warnings = plan.sanitize();
        if self.config.harden_log_luts && plan.harden() {
            warnings.push("log simulation enabled for flat-input LUT".to_string());
        }

        let tone = plan
            .tone_settings(self.config.white_balance_strength)
            .apply(&mut image);
        warnings.extend(tone.warnings.iter().cloned());
        stages.advance();

        let mut status = GradeStatus::Success;
        let (mut primary, mut secondary) = (None, None);

        if let Some(name) = plan.primary() {
            let request = LutRequest {
                primary: name,
                secondary: plan.secondary(),
                mix: plan.mix,
                intensity: plan.intensity,
            };
            let result = {
                let catalog = self.catalog();
                LutStage::new(&catalog, &self.cache).run(image, request)
            };
            image = match result {
                Ok(LutOutcome::Applied {
                    image,
                    primary: p,
                    secondary: s,
                    warnings: w,
                }) => {
                    let count = self.usage.record(&p.path);
                    trace!(lut = %p.path.display(), count, "usage");
                    warnings.extend(w);
                    primary = Some(p);
                    secondary = s;
                    image
                }
                Ok(LutOutcome::NotFound { image, requested }) => {
                    warnings.push(format!("LUT not found: {requested}"));
                    status = GradeStatus::LutNotFound(requested);
                    image
                }
                Err(e) => return GradeOutcome::failed(stages.current, e, tone, warnings),
            };
        }
        stages.advance();

        if (plan.sharpness - 1.0).abs() > f32::EPSILON {
            filter::sharpen(&mut image, plan.sharpness);
        }
        stages.advance();
        let last_completed = stages.current;
        let stage = stages.advance();

        debug!(status = %status, warnings = warnings.len(), "image graded");
        GradeOutcome {
            image: Some(image),
            status,
            stage,
            last_completed,
            tone,
            primary,
            secondary,
            warnings,
        }
    }

    /// Loads and grades an image file.
    pub fn process_file(&self, path: impl AsRef<Path>, plan: &ColorPlan) -> GradeOutcome {
        let path = path.as_ref();
        match io::load_rgb(path) {
            Ok(image) => self.process_image(image, plan),
            Err(e) => GradeOutcome::failed(Stage::Loaded, e, ToneReport::default(), Vec::new()),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("luts", &self.catalog().len())
            .field("cache", &self.cache.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grade_lut::{Lut3D, cube};
    use image::Rgb;

    fn pipeline_with(luts: &[(&str, Lut3D)]) -> (tempfile::TempDir, Pipeline) {
        let dir = tempfile::tempdir().unwrap();
        for (name, lut) in luts {
            cube::write_3d(dir.path().join(name), lut).unwrap();
        }
        let pipeline = Pipeline::open(dir.path()).unwrap();
        (dir, pipeline)
    }

    fn warm() -> Lut3D {
        Lut3D::from_fn(2, |r, g, b| [(r * 0.8 + 0.2).min(1.0), g, b * 0.8])
    }

    #[test]
    fn stage_sequence() {
        assert_eq!(Stage::Loaded.next(), Some(Stage::ToneAdjusted));
        assert_eq!(Stage::Sharpened.next(), Some(Stage::Done));
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Error.is_terminal());
    }

    #[test]
    fn success_records_usage() {
        let (_dir, pipeline) = pipeline_with(&[("Warm.cube", warm())]);
        let img = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let outcome = pipeline.process_image(img, &ColorPlan::with_lut("warm.cube"));
        assert!(outcome.is_success(), "{}", outcome.message());
        assert_eq!(outcome.stage, Stage::Done);
        assert_eq!(outcome.last_completed, Stage::Sharpened);
        assert_eq!(pipeline.usage().count("warm.cube"), 1);
        assert!(outcome.message().contains("Warm.cube"));
    }

    #[test]
    fn missing_lut_returns_tone_adjusted() {
        let (_dir, pipeline) = pipeline_with(&[("Warm.cube", warm())]);
        let img = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let plan = ColorPlan {
            brightness: 1.5,
            ..ColorPlan::with_lut("missing.cube")
        };
        let outcome = pipeline.process_image(img, &plan);
        assert!(matches!(outcome.status, GradeStatus::LutNotFound(_)));
        assert_eq!(outcome.stage, Stage::Done);
        let image = outcome.image.unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [150, 150, 150]);
        assert_eq!(pipeline.usage().total(), 0);
    }

    #[test]
    fn corrupt_lut_fails_image() {
        let (dir, pipeline) = pipeline_with(&[]);
        std::fs::write(dir.path().join("bad.cube"), "LUT_3D_SIZE 2\n1 1 1\n").unwrap();
        pipeline.reindex();
        let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let outcome = pipeline.process_image(img, &ColorPlan::with_lut("bad.cube"));
        assert!(outcome.image.is_none());
        assert_eq!(outcome.stage, Stage::Error);
        assert_eq!(outcome.last_completed, Stage::ToneAdjusted);
        let (image, message) = outcome.into_pair();
        assert!(image.is_none());
        assert!(message.contains("corrupt LUT"));
    }

    #[test]
    fn unreadable_file() {
        let (dir, pipeline) = pipeline_with(&[]);
        let outcome = pipeline.process_file(dir.path().join("nope.jpg"), &ColorPlan::default());
        assert!(outcome.image.is_none());
        assert_eq!(outcome.last_completed, Stage::Loaded);
        assert!(matches!(
            outcome.status,
            GradeStatus::Failed(GradeError::ImageIo { .. })
        ));
        assert_eq!(pipeline.classify_file(dir.path().join("nope.jpg")), (ImageClass::Standard, 0.0));
    }

    #[test]
    fn hardening_is_opt_in() {
        let (dir, pipeline) = pipeline_with(&[("flat_look.cube", Lut3D::identity(2).unwrap())]);
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 200, 200]));
        let plan = ColorPlan::with_lut("flat_look.cube");

        let outcome = pipeline.process_image(img.clone(), &plan);
        assert!(outcome.tone.steps.is_empty());
        assert!(outcome.warnings.is_empty());

        let hardening = Pipeline::new(PipelineConfig {
            lut_root: dir.path().to_path_buf(),
            harden_log_luts: true,
            ..Default::default()
        })
        .unwrap();
        let outcome = hardening.process_image(img, &plan);
        assert!(outcome.is_success());
        assert_eq!(outcome.tone.steps.first(), Some(&grade_ops::ToneStep::LogSimulation));
    }

    #[test]
    fn candidates_exhausted() {
        let (_dir, pipeline) = pipeline_with(&[]);
        let photo = RgbImage::from_fn(8, 8, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let names = ["F-Log_Eterna.cube", "SLog3.cube"];
        let result = pipeline.safe_candidates(&photo, &names);
        assert!(result.is_exhausted());
        assert!(result.names().is_empty());

        let flat = RgbImage::from_pixel(8, 8, Rgb([120, 120, 120]));
        assert_eq!(
            pipeline.safe_candidates(&flat, &names),
            Candidates::Available(names.to_vec())
        );
    }
}
