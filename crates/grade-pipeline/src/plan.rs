//! Color plans: the parameter set for one grading request.
//!
//! Plans come from an upstream planner as JSON (YAML also works). Keys
//! match the planner's output, e.g.
//!
//! ```json
//! {
//!   "selected_lut": "Kodak_Portra.cube",
//!   "secondary_lut": "Teal_Orange.cube",
//!   "mix_ratio": 0.3,
//!   "intensity": 0.8,
//!   "brightness": 1.05,
//!   "temperature": 0.2,
//!   "curve": "s_curve_soft",
//!   "simulate_log": false
//! }
//! ```

use std::path::Path;

use grade_ops::tone_curve::validate_points;
use grade_ops::{ControlPoint, CurvePreset, ToneSettings, safety};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{GradeError, GradeResult};

/// Tone curve request: control points or a preset name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurveSpec {
    /// `[[x, y], ...]` in 0-255.
    Points(Vec<[f32; 2]>),
    /// Preset name such as `hard_contrast`.
    Named(String),
}

impl CurveSpec {
    fn control_points(points: &[[f32; 2]]) -> Vec<ControlPoint> {
        points.iter().copied().map(ControlPoint::from).collect()
    }
}

/// Parameters of one grading invocation. Defaults are all identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPlan {
    /// Primary LUT name or path.
    #[serde(alias = "selected_lut")]
    pub primary_lut: Option<String>,
    /// Optional second LUT mixed with the primary.
    pub secondary_lut: Option<String>,
    /// Weight of the secondary LUT result, [0, 1].
    #[serde(alias = "mix_ratio")]
    pub mix: f32,
    /// Blend of the LUT result over the pre-LUT image, [0, 1].
    pub intensity: f32,
    /// Brightness multiplier.
    pub brightness: f32,
    /// Contrast multiplier, used when no curve applies.
    pub contrast: f32,
    /// Saturation multiplier.
    pub saturation: f32,
    /// Signed temperature shift.
    pub temperature: f32,
    /// Signed tint shift.
    pub tint: f32,
    /// Tone curve.
    #[serde(alias = "curve")]
    pub tone_curve: Option<CurveSpec>,
    /// Strength of a preset curve, [0, 1].
    pub curve_intensity: f32,
    /// Sharpness multiplier, applied last.
    pub sharpness: f32,
    /// Run the flat-scan recipe before everything else.
    #[serde(alias = "simulate_log")]
    pub log_simulation: bool,
}

impl Default for ColorPlan {
    fn default() -> Self {
        Self {
            primary_lut: None,
            secondary_lut: None,
            mix: 0.0,
            intensity: 1.0,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            temperature: 0.0,
            tint: 0.0,
            tone_curve: None,
            curve_intensity: 1.0,
            sharpness: 1.0,
            log_simulation: false,
        }
    }
}

fn check_unit(name: &str, v: f32) -> GradeResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(GradeError::InvalidPlan(format!("{name} {v} outside [0, 1]")));
    }
    Ok(())
}

fn check_positive(name: &str, v: f32) -> GradeResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(GradeError::InvalidPlan(format!("{name} {v} must be > 0")));
    }
    Ok(())
}

fn check_finite(name: &str, v: f32) -> GradeResult<()> {
    if !v.is_finite() {
        return Err(GradeError::InvalidPlan(format!("{name} is not finite")));
    }
    Ok(())
}

impl ColorPlan {
    /// Plan applying a single LUT at full strength.
    pub fn with_lut(name: impl Into<String>) -> Self {
        Self {
            primary_lut: Some(name.into()),
            ..Default::default()
        }
    }

    /// Parses a plan from JSON.
    pub fn from_json_str(json: &str) -> GradeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a plan from YAML.
    pub fn from_yaml_str(yaml: &str) -> GradeResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads a plan file; `.yaml`/`.yml` are YAML, anything else JSON.
    pub fn load(path: impl AsRef<Path>) -> GradeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::from_yaml_str(&content)
            }
            _ => Self::from_json_str(&content),
        }
    }

    /// Primary LUT reference, ignoring blank strings.
    pub fn primary(&self) -> Option<&str> {
        self.primary_lut.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Secondary LUT reference, ignoring blank strings.
    pub fn secondary(&self) -> Option<&str> {
        self.secondary_lut.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Strict check; the first problem becomes [`GradeError::InvalidPlan`].
    pub fn validate(&self) -> GradeResult<()> {
        check_unit("mix", self.mix)?;
        check_unit("intensity", self.intensity)?;
        check_unit("curve_intensity", self.curve_intensity)?;
        check_positive("brightness", self.brightness)?;
        check_positive("contrast", self.contrast)?;
        check_positive("saturation", self.saturation)?;
        check_positive("sharpness", self.sharpness)?;
        check_finite("temperature", self.temperature)?;
        check_finite("tint", self.tint)?;

        match &self.tone_curve {
            Some(CurveSpec::Points(points)) => {
                validate_points(&CurveSpec::control_points(points))
                    .map_err(|e| GradeError::InvalidPlan(e.to_string()))?;
            }
            Some(CurveSpec::Named(name)) if CurvePreset::from_name(name).is_none() => {
                return Err(GradeError::InvalidPlan(format!("unknown curve preset '{name}'")));
            }
            _ => {}
        }
        Ok(())
    }

    /// Repairs out-of-range values in place and lists what was changed.
    ///
    /// Ratios are clamped to [0, 1], non-positive or non-finite
    /// multipliers reset to 1.0, non-finite shifts to 0.0, and unusable
    /// curves dropped.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, v) in [
            ("mix", &mut self.mix),
            ("intensity", &mut self.intensity),
            ("curve_intensity", &mut self.curve_intensity),
        ] {
            if v.is_nan() {
                issues.push(format!("{name} is NaN, using 0"));
                *v = 0.0;
            } else if !(0.0..=1.0).contains(v) {
                let clamped = v.clamp(0.0, 1.0);
                issues.push(format!("{name} {v} clamped to {clamped}"));
                *v = clamped;
            }
        }

        for (name, v) in [
            ("brightness", &mut self.brightness),
            ("contrast", &mut self.contrast),
            ("saturation", &mut self.saturation),
            ("sharpness", &mut self.sharpness),
        ] {
            if !v.is_finite() || *v <= 0.0 {
                issues.push(format!("{name} {v} reset to 1.0"));
                *v = 1.0;
            }
        }

        for (name, v) in [("temperature", &mut self.temperature), ("tint", &mut self.tint)] {
            if !v.is_finite() {
                issues.push(format!("{name} reset to 0"));
                *v = 0.0;
            }
        }

        let drop_curve = match &self.tone_curve {
            Some(CurveSpec::Points(points)) => validate_points(&CurveSpec::control_points(points))
                .err()
                .map(|e| e.to_string()),
            Some(CurveSpec::Named(name)) => CurvePreset::from_name(name)
                .is_none()
                .then(|| format!("unknown curve preset '{name}'")),
            None => None,
        };
        if let Some(reason) = drop_curve {
            issues.push(format!("tone curve dropped: {reason}"));
            self.tone_curve = None;
        }

        for issue in &issues {
            warn!(issue = %issue, "plan sanitized");
        }
        issues
    }

    /// Forces log simulation for LUTs that expect flat input.
    ///
    /// When the primary LUT name has a flat-input token (see
    /// [`safety::requires_log_simulation`]) and log simulation is off,
    /// turns it on and restores intensity to 1.0.
    /// Returns true if the plan changed.
    pub fn harden(&mut self) -> bool {
        let Some(name) = self.primary() else {
            return false;
        };
        if self.log_simulation || !safety::requires_log_simulation(name) {
            return false;
        }
        warn!(lut = %name, "flat-input LUT without log simulation; enabling it");
        self.log_simulation = true;
        self.intensity = 1.0;
        true
    }

    /// Tone-stage settings derived from this plan.
    pub fn tone_settings(&self, white_balance_strength: f32) -> ToneSettings {
        let (curve_points, curve_preset) = match &self.tone_curve {
            Some(CurveSpec::Points(points)) => {
                (Some(points.iter().map(|&[x, y]| (x, y)).collect()), None)
            }
            Some(CurveSpec::Named(name)) => (None, CurvePreset::from_name(name)),
            None => (None, None),
        };

        ToneSettings {
            simulate_log: self.log_simulation,
            brightness: self.brightness,
            temperature: self.temperature,
            tint: self.tint,
            white_balance_strength,
            curve_points,
            curve_preset,
            curve_intensity: self.curve_intensity,
            contrast: self.contrast,
            saturation: self.saturation,
        }
    }
}
