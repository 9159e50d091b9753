//! Spline evaluation.

use super::spline::SplineData;

/// Evaluate a fitted spline at `x`.
///
/// Outside the knot range the curve continues linearly with the end
/// slope. An empty spline is the identity.
pub fn eval_curve(spline: &SplineData, x: f32) -> f32 {
    let (Some(first), Some(last)) = (spline.segments.first(), spline.segments.last()) else {
        return x;
    };

    if x <= first.start {
        return first.c + (x - first.start) * first.b;
    }
    if x >= spline.end {
        return last.at(spline.end) + (x - spline.end) * last.slope_at(spline.end);
    }

    let idx = spline.segments.partition_point(|s| s.start <= x).saturating_sub(1);
    spline.segments[idx].at(x)
}

#[cfg(test)]
mod tests {
    use super::super::spline::fit_spline;
    use super::super::types::ControlPoint;
    use super::*;

    #[test]
    fn identity_line() {
        let spline = fit_spline(&[ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)]);
        for x in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!((eval_curve(&spline, x) - x).abs() < 1e-5);
        }
    }

    #[test]
    fn passes_through_points() {
        let pts = [
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(0.3, 0.2),
            ControlPoint::new(0.7, 0.85),
            ControlPoint::new(1.0, 1.0),
        ];
        let spline = fit_spline(&pts);
        for p in pts {
            assert!((eval_curve(&spline, p.x) - p.y).abs() < 1e-4);
        }
    }

    #[test]
    fn extrapolates_linearly() {
        let spline = fit_spline(&[ControlPoint::new(0.2, 0.2), ControlPoint::new(0.8, 0.8)]);
        assert!((eval_curve(&spline, 0.0) - 0.0).abs() < 1e-5);
        assert!((eval_curve(&spline, 1.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_spline_is_identity() {
        assert_eq!(eval_curve(&SplineData::default(), 0.37), 0.37);
    }
}
