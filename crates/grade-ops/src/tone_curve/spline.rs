//! Piecewise-quadratic spline fitting.
//!
//! Each span between control points gets one quadratic when its end
//! slopes agree with the secant, otherwise two quadratics joined at an
//! interior knot. Slopes are adjusted so the derivative never turns
//! negative inside a span.

use super::slopes::estimate_slopes;
use super::types::ControlPoint;

/// One quadratic piece, `y = a*t² + b*t + c` with `t = x - start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Input position where this piece begins.
    pub start: f32,
    /// Quadratic coefficient.
    pub a: f32,
    /// Slope at `start`.
    pub b: f32,
    /// Value at `start`.
    pub c: f32,
}

impl Segment {
    /// Value at `x`.
    #[inline]
    pub fn at(&self, x: f32) -> f32 {
        let t = x - self.start;
        (self.a * t + self.b) * t + self.c
    }

    /// Derivative at `x`.
    #[inline]
    pub fn slope_at(&self, x: f32) -> f32 {
        2.0 * self.a * (x - self.start) + self.b
    }
}

/// Fitted spline: segments ordered by `start`, valid up to `end`.
#[derive(Debug, Clone, Default)]
pub struct SplineData {
    /// Quadratic pieces in input order.
    pub segments: Vec<Segment>,
    /// Input position of the last control point.
    pub end: f32,
}

impl SplineData {
    /// Number of quadratic pieces.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// True when nothing was fitted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Fit a spline through validated control points.
pub fn fit_spline(points: &[ControlPoint]) -> SplineData {
    if points.len() < 2 {
        return SplineData::default();
    }

    let mut slopes = estimate_slopes(points);
    let (mut data, splits) = fit_with_slopes(points, &slopes);
    if adjust_slopes(points, &mut slopes, &splits) {
        data = fit_with_slopes(points, &slopes).0;
    }
    data
}

/// Fits every span; also returns the interior knot of each split span.
fn fit_with_slopes(points: &[ControlPoint], slopes: &[f32]) -> (SplineData, Vec<Option<f32>>) {
    let mut segments = Vec::with_capacity(points.len() * 2);
    let mut splits = Vec::with_capacity(points.len() - 1);

    for (i, span) in points.windows(2).enumerate() {
        let (p0, p1) = (span[0], span[1]);
        let (s0, s1) = (slopes[i], slopes[i + 1]);
        let width = p1.x - p0.x;
        let secant = (p1.y - p0.y) / width;

        if (s0 + s1 - 2.0 * secant).abs() < 1e-6 {
            segments.push(Segment {
                start: p0.x,
                a: 0.5 * (s1 - s0) / width,
                b: s0,
                c: p0.y,
            });
            splits.push(None);
            continue;
        }

        let knot = split_point(p0, p1, s0, s1);
        let left = knot - p0.x;
        let joint = 2.0 * secant - s1 + (s1 - s0) * left / width;
        let head = Segment {
            start: p0.x,
            a: 0.5 * (joint - s0) / left,
            b: s0,
            c: p0.y,
        };
        segments.push(head);
        segments.push(Segment {
            start: knot,
            a: 0.5 * (s1 - joint) / (p1.x - knot),
            b: joint,
            c: head.at(knot),
        });
        splits.push(Some(knot));
    }

    let end = points.last().map_or(0.0, |p| p.x);
    (SplineData { segments, end }, splits)
}

/// Interior knot for a span that needs two quadratics.
fn split_point(p0: ControlPoint, p1: ControlPoint, s0: f32, s1: f32) -> f32 {
    let width = p1.x - p0.x;
    let secant = (p1.y - p0.y) / width;
    let (d0, d1) = (s0 - secant, s1 - secant);

    if d0 * d1 >= 0.0 {
        0.5 * (p0.x + p1.x)
    } else if d0.abs() > d1.abs() {
        p1.x + d0 * width / (s1 - s0)
    } else {
        p0.x + d1 * width / (s1 - s0)
    }
}

/// Rescales slopes of split spans whose joint slope went negative.
fn adjust_slopes(points: &[ControlPoint], slopes: &mut [f32], splits: &[Option<f32>]) -> bool {
    let mut adjusted = false;

    for (i, knot) in splits.iter().enumerate() {
        let Some(knot) = *knot else {
            continue;
        };
        let (p0, p1) = (points[i], points[i + 1]);
        let width = p1.x - p0.x;
        let rise = p1.y - p0.y;
        let weighted = ((knot - p0.x) * slopes[i] + (p1.x - knot) * slopes[i + 1]) / width;

        if 2.0 * rise / width - weighted < 0.0 {
            adjusted = true;
            let secant = rise / width;
            let aim = (0.005 * (slopes[i] + slopes[i + 1])).min(secant);
            let scale = (2.0 * secant - aim) / weighted;
            slopes[i] *= scale;
            slopes[i + 1] *= scale;
        }
    }

    adjusted
}
