//! Tone and color adjustment stage.
//!
//! Every operation works in place on an 8-bit RGB image and clamps to
//! [0, 255]. [`ToneSettings::apply`] runs them in a fixed order:
//!
//! 1. log simulation
//! 2. brightness
//! 3. white balance
//! 4. tone curve (control points, else preset, else global contrast)
//! 5. saturation
//!
//! Sharpening is not part of this stage; it runs after the LUT stage.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pixel::{enhance, luma};
use crate::tone_curve::{ControlPoint, CurvePreset, ToneCurve};

/// Default proportionality constant for temperature and tint.
pub const DEFAULT_WB_STRENGTH: f32 = 0.25;

/// Saturation factor of the flat-scan recipe.
pub const LOG_SIM_SATURATION: f32 = 0.7;
/// Contrast factor of the flat-scan recipe.
pub const LOG_SIM_CONTRAST: f32 = 0.6;
/// Brightness factor of the flat-scan recipe.
pub const LOG_SIM_BRIGHTNESS: f32 = 1.1;

const IDENTITY_EPS: f32 = 1e-6;

#[inline]
fn is_unit(v: f32) -> bool {
    (v - 1.0).abs() <= IDENTITY_EPS
}

/// Scales every sample by `factor`.
pub fn brightness(image: &mut RgbImage, factor: f32) {
    for v in image.iter_mut() {
        *v = enhance(*v, 0.0, factor);
    }
}

/// Mean luma of the image, rounded to an integer level.
pub fn mean_luma(image: &RgbImage) -> f32 {
    let n = image.width() as usize * image.height() as usize;
    if n == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| luma(p.0) as u64).sum();
    (sum as f64 / n as f64).round() as f32
}

/// Pushes samples away from (or toward) the mean luma by `factor`.
pub fn contrast(image: &mut RgbImage, factor: f32) {
    let mean = mean_luma(image);
    for v in image.iter_mut() {
        *v = enhance(*v, mean, factor);
    }
}

/// Scales chroma around each pixel's own luma; 0 yields grayscale.
pub fn saturation(image: &mut RgbImage, factor: f32) {
    for p in image.pixels_mut() {
        let gray = luma(p.0) as f32;
        for v in p.0.iter_mut() {
            *v = enhance(*v, gray, factor);
        }
    }
}

/// Per-channel gains for a temperature/tint shift.
///
/// Positive temperature warms (red up, blue down); positive tint pulls
/// green down.
pub fn white_balance_gains(temperature: f32, tint: f32, strength: f32) -> [f32; 3] {
    [
        1.0 + temperature * strength,
        1.0 - tint * strength,
        1.0 - temperature * strength,
    ]
}

/// Multiplies each channel by its white-balance gain.
///
/// Results are clamped and truncated.
pub fn white_balance(image: &mut RgbImage, temperature: f32, tint: f32, strength: f32) {
    let gains = white_balance_gains(temperature, tint, strength);
    for p in image.pixels_mut() {
        for (v, g) in p.0.iter_mut().zip(gains) {
            *v = (*v as f32 * g).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Approximates a flat log scan: desaturate, compress contrast, lift.
pub fn simulate_log(image: &mut RgbImage) {
    saturation(image, LOG_SIM_SATURATION);
    contrast(image, LOG_SIM_CONTRAST);
    brightness(image, LOG_SIM_BRIGHTNESS);
}

/// One executed step of the tone stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneStep {
    /// Flat-scan recipe.
    LogSimulation,
    /// Brightness multiplier.
    Brightness(f32),
    /// Temperature and tint.
    WhiteBalance {
        /// Temperature shift.
        temperature: f32,
        /// Tint shift.
        tint: f32,
    },
    /// Spline curve from control points.
    Curve,
    /// Named preset curve.
    Preset(CurvePreset),
    /// Global contrast fallback.
    Contrast(f32),
    /// Saturation multiplier.
    Saturation(f32),
}

/// What [`ToneSettings::apply`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToneReport {
    /// Steps that ran, in order.
    pub steps: Vec<ToneStep>,
    /// Degradations, e.g. rejected curve points.
    pub warnings: Vec<String>,
}

/// Parameters of the tone/color stage. Defaults are all identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSettings {
    /// Run the flat-scan recipe first.
    pub simulate_log: bool,
    /// Brightness multiplier.
    pub brightness: f32,
    /// Signed temperature shift, roughly [-1, 1].
    pub temperature: f32,
    /// Signed tint shift, roughly [-1, 1].
    pub tint: f32,
    /// Scale applied to temperature and tint.
    pub white_balance_strength: f32,
    /// Control points `(x, y)` in 0-255.
    pub curve_points: Option<Vec<(f32, f32)>>,
    /// Preset used when no valid control points are given.
    pub curve_preset: Option<CurvePreset>,
    /// Blend of the preset with identity.
    pub curve_intensity: f32,
    /// Contrast multiplier used when no curve applies.
    pub contrast: f32,
    /// Saturation multiplier.
    pub saturation: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            simulate_log: false,
            brightness: 1.0,
            temperature: 0.0,
            tint: 0.0,
            white_balance_strength: DEFAULT_WB_STRENGTH,
            curve_points: None,
            curve_preset: None,
            curve_intensity: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl ToneSettings {
    /// True if applying these settings cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        !self.simulate_log
            && is_unit(self.brightness)
            && self.temperature == 0.0
            && self.tint == 0.0
            && self.curve_points.is_none()
            && self.curve_preset.is_none_or(|p| p == CurvePreset::Linear)
            && is_unit(self.contrast)
            && is_unit(self.saturation)
    }

    /// Resolves step 4: the curve to apply, if any.
    ///
    /// Invalid control points are reported and skipped.
    fn curve(&self, report: &mut ToneReport) -> Option<(ToneCurve, ToneStep)> {
        if let Some(raw) = &self.curve_points {
            let points: Vec<ControlPoint> = raw.iter().copied().map(ControlPoint::from).collect();
            match ToneCurve::from_points(&points) {
                Ok(curve) => return Some((curve, ToneStep::Curve)),
                Err(e) => {
                    warn!(error = %e, "ignoring tone curve");
                    report.warnings.push(format!("tone curve skipped: {e}"));
                }
            }
        }
        match self.curve_preset {
            Some(CurvePreset::Linear) | None => None,
            Some(preset) => Some((
                ToneCurve::from_preset(preset, self.curve_intensity),
                ToneStep::Preset(preset),
            )),
        }
    }

    /// Runs the stage on `image` in place.
    pub fn apply(&self, image: &mut RgbImage) -> ToneReport {
        let mut report = ToneReport::default();

        if self.simulate_log {
            simulate_log(image);
            report.steps.push(ToneStep::LogSimulation);
        }

        if !is_unit(self.brightness) {
            brightness(image, self.brightness);
            report.steps.push(ToneStep::Brightness(self.brightness));
        }

        if self.temperature != 0.0 || self.tint != 0.0 {
            white_balance(image, self.temperature, self.tint, self.white_balance_strength);
            report.steps.push(ToneStep::WhiteBalance {
                temperature: self.temperature,
                tint: self.tint,
            });
        }

        match self.curve(&mut report) {
            Some((curve, step)) => {
                curve.apply(image);
                report.steps.push(step);
            }
            None if !is_unit(self.contrast) => {
                contrast(image, self.contrast);
                report.steps.push(ToneStep::Contrast(self.contrast));
            }
            None => {}
        }

        if !is_unit(self.saturation) {
            saturation(image, self.saturation);
            report.steps.push(ToneStep::Saturation(self.saturation));
        }

        debug!(steps = report.steps.len(), warnings = report.warnings.len(), "tone stage done");
        report
    }
}
