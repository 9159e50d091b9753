//! Slope estimation at tone-curve control points.

use super::types::ControlPoint;

/// Smallest slope allowed at the curve ends.
const MIN_END_SLOPE: f32 = 0.01;

/// Estimate slopes at control points.
///
/// Interior slopes are length-weighted averages of the neighbouring
/// secants; runs of collinear segments share one weight so straight
/// stretches stay straight. End slopes are extrapolated from the first
/// and last interior slope and kept positive.
pub fn estimate_slopes(points: &[ControlPoint]) -> Vec<f32> {
    let n = points.len();
    if n < 2 {
        return vec![];
    }

    let (secants, mut weights): (Vec<f32>, Vec<f32>) = points
        .windows(2)
        .map(|w| {
            let (dx, dy) = (w[1].x - w[0].x, w[1].y - w[0].y);
            (dy / dx, dx.hypot(dy))
        })
        .unzip();

    if n == 2 {
        return vec![secants[0]; 2];
    }

    // A run of equal secants gets the run's total length as its weight.
    let mut run_start = 0;
    for i in 1..=secants.len() {
        let continues = i < secants.len() && (secants[i] - secants[i - 1]).abs() < 1e-6;
        if !continues {
            let total: f32 = weights[run_start..i].iter().sum();
            weights[run_start..i].fill(total);
            run_start = i;
        }
    }

    let mut slopes = vec![0.0; n];
    for k in 1..n - 1 {
        slopes[k] = (weights[k] * secants[k] + weights[k - 1] * secants[k - 1])
            / (weights[k] + weights[k - 1]);
    }
    slopes[0] = MIN_END_SLOPE.max(0.5 * (3.0 * secants[0] - slopes[1]));
    slopes[n - 1] = MIN_END_SLOPE.max(0.5 * (3.0 * secants[n - 2] - slopes[n - 2]));
    slopes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_points() {
        let pts = vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)];
        let slopes = estimate_slopes(&pts);
        assert_eq!(slopes, vec![1.0, 1.0]);
    }

    #[test]
    fn collinear_points() {
        let pts = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(0.5, 0.5),
            ControlPoint::new(1.0, 1.0),
        ];
        for s in estimate_slopes(&pts) {
            assert!((s - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn end_slopes_stay_positive() {
        let pts = vec![
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(0.2, 0.6),
            ControlPoint::new(1.0, 0.62),
        ];
        let slopes = estimate_slopes(&pts);
        assert!(slopes[0] > 0.0);
        assert!(slopes[2] >= MIN_END_SLOPE);
    }
}
