//! Named tone-curve presets.

use serde::{Deserialize, Serialize};

/// Built-in tone curves, each blended with identity by an intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePreset {
    /// Identity.
    #[default]
    Linear,
    /// Gentle logistic S-curve.
    SCurveSoft,
    /// Faded blacks; lifts the shadows and leaves highlights alone.
    LiftedShadows,
    /// Steep logistic S-curve.
    HardContrast,
}

impl CurvePreset {
    /// All presets, in declaration order.
    pub const ALL: [CurvePreset; 4] = [
        CurvePreset::Linear,
        CurvePreset::SCurveSoft,
        CurvePreset::LiftedShadows,
        CurvePreset::HardContrast,
    ];

    /// Parses a preset name such as `s_curve_soft` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            CurvePreset::Linear => "linear",
            CurvePreset::SCurveSoft => "s_curve_soft",
            CurvePreset::LiftedShadows => "lifted_shadows",
            CurvePreset::HardContrast => "hard_contrast",
        }
    }

    /// Curve output for input level `x` (0-255) at the given intensity.
    ///
    /// Not clamped.
    pub fn eval(self, x: f64, intensity: f64) -> f64 {
        let logistic = |k: f64| 255.0 / (1.0 + (-k * (x - 128.0)).exp());
        match self {
            CurvePreset::Linear => x,
            CurvePreset::SCurveSoft => x * (1.0 - intensity) + logistic(0.025) * intensity,
            CurvePreset::LiftedShadows => x + (25.0 - x * 0.1) * (-0.02 * x).exp() * intensity,
            CurvePreset::HardContrast => x * (1.0 - intensity) + logistic(0.04) * intensity,
        }
    }

    /// 256-entry table; values are clipped to [0, 255] and truncated.
    pub fn table(self, intensity: f32) -> [u8; 256] {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let y = self.eval(i as f64, intensity as f64);
            *slot = if y.is_nan() { 0 } else { y.clamp(0.0, 255.0) as u8 };
        }
        table
    }
}

impl std::fmt::Display for CurvePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
