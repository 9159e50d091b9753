//! 3-dimensional lookup table.
//!
//! A 3D LUT maps an RGB triple to an RGB triple through a cube of
//! samples spread uniformly over the input domain.

use crate::{Interpolation, LutError, LutResult};

/// A 3-dimensional lookup table.
///
/// # Structure
///
/// - `size^3` entries, each an RGB output triple
/// - Stored in file (raster) order: R varies fastest, then G, then B
/// - Trilinear or tetrahedral interpolation for lookup
///
/// # Example
///
/// ```rust
/// use grade_lut::Lut3D;
///
/// let lut = Lut3D::identity(17).unwrap();
/// let output = lut.apply([0.5, 0.3, 0.2]);
/// assert!((output[0] - 0.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Grid samples, `index = r + g*size + b*size²`.
    pub data: Vec<[f32; 3]>,
    /// Cube size (samples per axis).
    pub size: usize,
    /// Optional `TITLE` from the source file.
    pub title: Option<String>,
    /// Input domain minimum (per channel).
    pub domain_min: [f32; 3],
    /// Input domain maximum (per channel).
    pub domain_max: [f32; 3],
    /// Interpolation method.
    pub interpolation: Interpolation,
}

impl Lut3D {
    /// Creates an identity (pass-through) 3D LUT.
    ///
    /// Fails with [`LutError::InvalidSize`] when `size < 2`.
    pub fn identity(size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!(
                "cube size must be at least 2, got {}",
                size
            )));
        }
        Ok(Self::from_fn(size, |r, g, b| [r, g, b]))
    }

    /// Builds a LUT by evaluating `f` at every grid point.
    ///
    /// `f` receives normalized grid coordinates in [0, 1]. `size` is
    /// trusted; use [`Lut3D::from_data`] for sizes read from input.
    pub fn from_fn<F>(size: usize, f: F) -> Self
    where
        F: Fn(f32, f32, f32) -> [f32; 3],
    {
        let n = (size.max(2) - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push(f(r as f32 / n, g as f32 / n, b as f32 / n));
                }
            }
        }

        Self {
            data,
            size,
            title: None,
            domain_min: [0.0, 0.0, 0.0],
            domain_max: [1.0, 1.0, 1.0],
            interpolation: Interpolation::Trilinear,
        }
    }

    /// Creates a 3D LUT from raw data in raster order.
    ///
    /// Requires `size >= 2`, exactly `size^3` entries and every component
    /// inside [0, 1].
    pub fn from_data(data: Vec<[f32; 3]>, size: usize) -> LutResult<Self> {
        if size < 2 {
            return Err(LutError::InvalidSize(format!(
                "cube size must be at least 2, got {}",
                size
            )));
        }
        let expected = size
            .checked_mul(size)
            .and_then(|v| v.checked_mul(size))
            .ok_or_else(|| LutError::InvalidSize(format!("cube size {} overflows", size)))?;
        if data.len() != expected {
            return Err(LutError::InvalidSize(format!(
                "expected {} entries for size {}, got {}",
                expected,
                size,
                data.len()
            )));
        }
        if let Some((index, rgb)) = data
            .iter()
            .enumerate()
            .find(|(_, rgb)| rgb.iter().any(|v| !(0.0..=1.0).contains(v)))
        {
            return Err(LutError::OutOfRange {
                index,
                r: rgb[0],
                g: rgb[1],
                b: rgb[2],
            });
        }

        Ok(Self {
            data,
            size,
            title: None,
            domain_min: [0.0, 0.0, 0.0],
            domain_max: [1.0, 1.0, 1.0],
            interpolation: Interpolation::Trilinear,
        })
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Sets the interpolation method.
    pub fn with_interpolation(mut self, interp: Interpolation) -> Self {
        self.interpolation = interp;
        self
    }

    /// Applies the LUT to an RGB value in the input domain.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let cell = self.cell(rgb);
        match self.interpolation {
            Interpolation::Trilinear => cell.trilinear(),
            Interpolation::Tetrahedral => cell.tetrahedral(),
        }
    }

    /// Grid cell enclosing `rgb`. Inputs outside the domain clamp to its edge.
    fn cell(&self, rgb: [f32; 3]) -> Cell {
        let steps = (self.size - 1) as f32;
        let mut origin = [0usize; 3];
        let mut frac = [0.0f32; 3];
        for axis in 0..3 {
            let span = self.domain_max[axis] - self.domain_min[axis];
            let t = if span > 0.0 {
                ((rgb[axis] - self.domain_min[axis]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let pos = t * steps;
            origin[axis] = (pos.floor() as usize).min(self.size - 2);
            frac[axis] = pos - origin[axis] as f32;
        }

        let mut corners = [[0.0f32; 3]; 8];
        for (k, corner) in corners.iter_mut().enumerate() {
            let r = origin[0] + (k & 1);
            let g = origin[1] + ((k >> 1) & 1);
            let b = origin[2] + ((k >> 2) & 1);
            *corner = self.data[(b * self.size + g) * self.size + r];
        }
        Cell { corners, frac }
    }
}

/// Eight samples around a lookup point. Corner index bits: 1 = red, 2 = green, 4 = blue.
struct Cell {
    corners: [[f32; 3]; 8],
    frac: [f32; 3],
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

impl Cell {
    fn trilinear(&self) -> [f32; 3] {
        let [fr, fg, fb] = self.frac;
        let c = &self.corners;
        let low = lerp3(lerp3(c[0], c[1], fr), lerp3(c[2], c[3], fr), fg);
        let high = lerp3(lerp3(c[4], c[5], fr), lerp3(c[6], c[7], fr), fg);
        lerp3(low, high, fb)
    }

    /// Walks from the origin corner to the far corner, stepping along
    /// axes in decreasing order of their fractional offset.
    fn tetrahedral(&self) -> [f32; 3] {
        let mut axes = [0usize, 1, 2];
        axes.sort_by(|&a, &b| self.frac[b].total_cmp(&self.frac[a]));

        let mut out = self.corners[0];
        let mut prev = self.corners[0];
        let mut index = 0;
        for axis in axes {
            index |= 1 << axis;
            let next = self.corners[index];
            let t = self.frac[axis];
            for ch in 0..3 {
                out[ch] += t * (next[ch] - prev[ch]);
            }
            prev = next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_passes_through() {
        let lut = Lut3D::identity(17).unwrap();
        let result = lut.apply([0.5, 0.3, 0.8]);
        assert_abs_diff_eq!(result[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(result[1], 0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(result[2], 0.8, epsilon = 1e-5);
    }

    #[test]
    fn corners() {
        let lut = Lut3D::identity(2).unwrap();
        assert_eq!(lut.apply([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        assert_eq!(lut.apply([1.0, 1.0, 1.0]), [1.0, 1.0, 1.0]);
        assert_eq!(lut.apply([1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn raster_order_red_fastest() {
        let lut = Lut3D::identity(3).unwrap();
        assert_eq!(lut.data[1], [0.5, 0.0, 0.0]);
        assert_eq!(lut.data[3], [0.0, 0.5, 0.0]);
        assert_eq!(lut.data[9], [0.0, 0.0, 0.5]);
    }

    #[test]
    fn tetrahedral_matches_identity() {
        let lut = Lut3D::identity(33).unwrap().with_interpolation(Interpolation::Tetrahedral);
        let result = lut.apply([0.5, 0.3, 0.8]);
        assert_abs_diff_eq!(result[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(result[1], 0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(result[2], 0.8, epsilon = 1e-5);
    }

    #[test]
    fn inputs_outside_domain_clamp() {
        let lut = Lut3D::identity(5).unwrap();
        assert_eq!(lut.apply([-0.5, 2.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn from_data_rejects_bad_input() {
        assert!(matches!(
            Lut3D::from_data(vec![[0.0; 3]; 7], 2),
            Err(LutError::InvalidSize(_))
        ));
        assert!(matches!(
            Lut3D::from_data(vec![[0.0; 3]; 1], 1),
            Err(LutError::InvalidSize(_))
        ));

        let mut data = vec![[0.5f32; 3]; 8];
        data[5] = [0.5, 1.2, 0.5];
        match Lut3D::from_data(data, 2) {
            Err(LutError::OutOfRange { index, g, .. }) => {
                assert_eq!(index, 5);
                assert_abs_diff_eq!(g, 1.2);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn identity_rejects_degenerate_size() {
        for size in [0, 1] {
            assert!(matches!(Lut3D::identity(size), Err(LutError::InvalidSize(_))));
        }
        assert_eq!(Lut3D::identity(2).unwrap().data.len(), 8);
    }

    #[test]
    fn constant_lut() {
        let lut = Lut3D::from_data(vec![[0.5, 0.5, 0.5]; 8], 2).unwrap();
        assert_eq!(lut.apply([0.2, 0.9, 0.4]), [0.5, 0.5, 0.5]);
    }
}
