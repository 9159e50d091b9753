//! Pipeline configuration.
//!
//! Loaded from YAML; every key is optional:
//!
//! ```yaml
//! lut_root: /srv/luts
//! cache_capacity: 64
//! fuzzy_cutoff: 0.7
//! interpolation: tetrahedral
//! ```

use std::path::{Path, PathBuf};

use grade_lut::{Interpolation, cache, cube, fuzzy};
use grade_ops::analyze::LOG_STDDEV_THRESHOLD;
use grade_ops::tone::DEFAULT_WB_STRENGTH;
use serde::{Deserialize, Serialize};

use crate::{GradeError, GradeResult};

/// Settings shared by every image a [`Pipeline`](crate::Pipeline) processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory indexed for LUT files.
    pub lut_root: PathBuf,
    /// Recognized LUT file suffix, case-insensitive.
    pub lut_extension: String,
    /// Parsed LUTs kept resident.
    pub cache_capacity: usize,
    /// Minimum similarity for fuzzy name resolution.
    pub fuzzy_cutoff: f64,
    /// Luma stddev below which a source counts as log footage.
    pub log_threshold: f32,
    /// Proportionality constant for temperature and tint.
    pub white_balance_strength: f32,
    /// `trilinear` or `tetrahedral`.
    pub interpolation: String,
    /// Force log simulation for plans whose LUT name marks flat input.
    /// Off by default; when on, the orchestrator rewrites such plans.
    pub harden_log_luts: bool,
    /// Where the CLI writes graded images.
    pub output_dir: PathBuf,
    /// Prefix prepended to output file names.
    pub output_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lut_root: PathBuf::from("luts"),
            lut_extension: cube::EXTENSION.to_string(),
            cache_capacity: cache::DEFAULT_CAPACITY,
            fuzzy_cutoff: fuzzy::DEFAULT_CUTOFF,
            log_threshold: LOG_STDDEV_THRESHOLD,
            white_balance_strength: DEFAULT_WB_STRENGTH,
            interpolation: "trilinear".to_string(),
            harden_log_luts: false,
            output_dir: PathBuf::from("output"),
            output_prefix: "graded_".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> GradeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GradeError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> GradeResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> GradeResult<()> {
        if self.cache_capacity == 0 {
            return Err(GradeError::Config("cache_capacity must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(GradeError::Config(format!(
                "fuzzy_cutoff {} outside [0, 1]",
                self.fuzzy_cutoff
            )));
        }
        if !self.log_threshold.is_finite() || self.log_threshold < 0.0 {
            return Err(GradeError::Config(format!(
                "log_threshold {} must be a non-negative number",
                self.log_threshold
            )));
        }
        if !self.white_balance_strength.is_finite() {
            return Err(GradeError::Config("white_balance_strength must be finite".into()));
        }
        if self.lut_extension.trim_start_matches('.').is_empty() {
            return Err(GradeError::Config("lut_extension is empty".into()));
        }
        self.interpolation()?;
        Ok(())
    }

    /// Parsed interpolation method.
    pub fn interpolation(&self) -> GradeResult<Interpolation> {
        Interpolation::from_name(&self.interpolation).ok_or_else(|| {
            GradeError::Config(format!("unknown interpolation '{}'", self.interpolation))
        })
    }

    /// Output location for `input`: `<output_dir>/<output_prefix><file name>`.
    pub fn output_path(&self, input: impl AsRef<Path>) -> PathBuf {
        let name = input
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());
        self.output_dir.join(format!("{}{}", self.output_prefix, name))
    }
}
