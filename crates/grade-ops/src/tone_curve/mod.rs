//! Monotone tone curves as 256-entry lookup tables.
//!
//! Control points are fitted with a piecewise-quadratic spline (the
//! OpenColorIO grading B-spline construction), then sampled once per
//! 8-bit level. The same table is applied to all three channels.
//!
//! ```ignore
//! use grade_ops::{ControlPoint, ToneCurve};
//!
//! let curve = ToneCurve::from_points(&[
//!     ControlPoint::new(0.0, 0.0),
//!     ControlPoint::new(64.0, 48.0),
//!     ControlPoint::new(255.0, 255.0),
//! ])?;
//! curve.apply(&mut image);
//! ```

mod eval;
mod preset;
mod slopes;
mod spline;
mod types;

pub use eval::eval_curve;
pub use preset::CurvePreset;
pub use spline::{SplineData, fit_spline};
pub use types::{CURVE_MAX, ControlPoint, validate_points};

use image::RgbImage;
use tracing::trace;

use crate::OpsResult;

/// A per-level lookup table applied identically to R, G and B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCurve {
    table: [u8; 256],
}

impl ToneCurve {
    /// The identity curve.
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { table }
    }

    /// Builds a smooth monotone curve through `points` (0-255 coordinates).
    ///
    /// Fails with [`OpsError::InvalidCurve`](crate::OpsError::InvalidCurve)
    /// for fewer than two points, coordinates outside [0, 255], x not
    /// strictly increasing or y decreasing.
    pub fn from_points(points: &[ControlPoint]) -> OpsResult<Self> {
        validate_points(points)?;

        let normalized: Vec<ControlPoint> = points.iter().map(|p| p.scaled(CURVE_MAX)).collect();
        let spline = fit_spline(&normalized);
        trace!(points = points.len(), segments = spline.num_segments(), "fitted tone curve");

        let mut table = [0u8; 256];
        let mut floor = 0u8;
        for (i, slot) in table.iter_mut().enumerate() {
            let y = eval_curve(&spline, i as f32 / CURVE_MAX) * CURVE_MAX;
            // Quadratic overshoot must not break monotonicity.
            let v = crate::pixel::to_u8(y).max(floor);
            floor = v;
            *slot = v;
        }

        Ok(Self { table })
    }

    /// Table for a named preset at the given intensity.
    pub fn from_preset(preset: CurvePreset, intensity: f32) -> Self {
        Self {
            table: preset.table(intensity),
        }
    }

    /// The lookup table.
    #[inline]
    pub fn table(&self) -> &[u8; 256] {
        &self.table
    }

    /// Output level for `v`.
    #[inline]
    pub fn map(&self, v: u8) -> u8 {
        self.table[v as usize]
    }

    /// True if every level maps to itself.
    pub fn is_identity(&self) -> bool {
        self.table.iter().enumerate().all(|(i, &v)| i == v as usize)
    }

    /// Remaps every channel of `image` in place.
    pub fn apply(&self, image: &mut RgbImage) {
        for v in image.iter_mut() {
            *v = self.table[*v as usize];
        }
    }
}

impl Default for ToneCurve {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn pts(v: &[(f32, f32)]) -> Vec<ControlPoint> {
        v.iter().copied().map(ControlPoint::from).collect()
    }

    #[test]
    fn diagonal_is_identity() {
        let curve = ToneCurve::from_points(&pts(&[(0.0, 0.0), (255.0, 255.0)])).unwrap();
        assert!(curve.is_identity());
    }

    #[test]
    fn passes_through_points_and_stays_monotone() {
        let curve = ToneCurve::from_points(&pts(&[
            (0.0, 0.0),
            (64.0, 40.0),
            (192.0, 220.0),
            (255.0, 255.0),
        ]))
        .unwrap();
        let t = curve.table();
        assert_eq!(t[0], 0);
        assert_eq!(t[255], 255);
        assert!((t[64] as i32 - 40).abs() <= 1);
        assert!((t[192] as i32 - 220).abs() <= 1);
        assert!(t.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn steep_points_stay_monotone() {
        let curve = ToneCurve::from_points(&pts(&[
            (0.0, 0.0),
            (30.0, 200.0),
            (40.0, 205.0),
            (255.0, 255.0),
        ]))
        .unwrap();
        assert!(curve.table().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rejects_bad_points() {
        assert!(ToneCurve::from_points(&pts(&[(0.0, 0.0)])).is_err());
        assert!(ToneCurve::from_points(&pts(&[(100.0, 0.0), (50.0, 255.0)])).is_err());
    }

    #[test]
    fn applies_to_all_channels() {
        let curve = ToneCurve::from_preset(CurvePreset::LiftedShadows, 1.0);
        let mut img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        curve.apply(&mut img);
        assert_eq!(img.get_pixel(1, 1).0, [25, 25, 25]);
    }
}
