//! Control points for tone curves.

use crate::{OpsError, OpsResult};

/// Largest coordinate of an 8-bit tone curve.
pub const CURVE_MAX: f32 = 255.0;

/// A single control point on a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Input level.
    pub x: f32,
    /// Output level.
    pub y: f32,
}

impl ControlPoint {
    /// Create a new control point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same point with both coordinates divided by `scale`.
    #[inline]
    pub(crate) fn scaled(self, scale: f32) -> Self {
        Self::new(self.x / scale, self.y / scale)
    }
}

impl From<(f32, f32)> for ControlPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for ControlPoint {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Checks that points describe a monotone 8-bit curve.
///
/// Requires at least two points, coordinates inside [0, 255], strictly
/// increasing x and non-decreasing y.
pub fn validate_points(points: &[ControlPoint]) -> OpsResult<()> {
    if points.len() < 2 {
        return Err(OpsError::InvalidCurve(format!(
            "need at least 2 control points, got {}",
            points.len()
        )));
    }

    for (i, p) in points.iter().enumerate() {
        let inside = |v: f32| v.is_finite() && (0.0..=CURVE_MAX).contains(&v);
        if !inside(p.x) || !inside(p.y) {
            return Err(OpsError::InvalidCurve(format!(
                "point {} ({}, {}) outside [0, {}]",
                i, p.x, p.y, CURVE_MAX
            )));
        }
    }

    for (i, pair) in points.windows(2).enumerate() {
        if pair[1].x <= pair[0].x {
            return Err(OpsError::InvalidCurve(format!(
                "x must be strictly increasing (point {}: {} after {})",
                i + 1,
                pair[1].x,
                pair[0].x
            )));
        }
        if pair[1].y < pair[0].y {
            return Err(OpsError::InvalidCurve(format!(
                "y must be non-decreasing (point {}: {} after {})",
                i + 1,
                pair[1].y,
                pair[0].y
            )));
        }
    }

    Ok(())
}
