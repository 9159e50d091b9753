//! Convolution and sharpening.
//!
//! Sharpening follows the classic enhance model: the image is blurred
//! with a 3x3 smoothing kernel, then every sample is pushed away from its
//! blurred value by the sharpness factor. Factor 1.0 leaves the image
//! unchanged, 0.0 returns the blurred image.

use image::RgbImage;
use tracing::trace;

use crate::pixel::{enhance, to_u8};

/// 3x3 convolution weights, `weights[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3 {
    /// Row-major weights; the centre is `weights[1][1]`.
    pub weights: [[f32; 3]; 3],
}

impl Kernel3 {
    /// Smoothing kernel: centre weight 5, neighbours 1, normalized by 13.
    pub const SMOOTH: Self = {
        let n = 1.0 / 13.0;
        Self {
            weights: [[n, n, n], [n, 5.0 / 13.0, n], [n, n, n]],
        }
    };

    /// Sum of all weights; 1.0 for a brightness-preserving kernel.
    pub fn sum(&self) -> f32 {
        self.weights.iter().flatten().sum()
    }
}

/// Convolves an 8-bit RGB image with a 3x3 kernel.
///
/// The one-pixel border is copied from the source unfiltered.
pub fn convolve(src: &RgbImage, kernel: &Kernel3) -> RgbImage {
    let mut dst = src.clone();
    let (w, h) = src.dimensions();
    if w < 3 || h < 3 {
        return dst;
    }
    trace!(width = w, height = h, "convolve 3x3");

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0.0f32; 3];
            for (dy, row) in kernel.weights.iter().enumerate() {
                for (dx, &weight) in row.iter().enumerate() {
                    let px = src.get_pixel(x + dx as u32 - 1, y + dy as u32 - 1);
                    for (a, &v) in acc.iter_mut().zip(&px.0) {
                        *a += v as f32 * weight;
                    }
                }
            }
            dst.put_pixel(x, y, image::Rgb(acc.map(to_u8)));
        }
    }
    dst
}

/// Sharpens by `factor` against a smoothed copy of the image.
///
/// Values above 1.0 sharpen, values between 0 and 1 soften.
pub fn sharpen(image: &mut RgbImage, factor: f32) {
    let blurred = convolve(image, &Kernel3::SMOOTH);
    trace!(factor, "sharpen");
    for (v, &b) in image.iter_mut().zip(blurred.as_raw()) {
        *v = enhance(*v, b as f32, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn spot() -> RgbImage {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([100, 100, 100]));
        img.put_pixel(2, 2, Rgb([200, 200, 200]));
        img
    }

    #[test]
    fn smooth_sums_to_one() {
        assert!((Kernel3::SMOOTH.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_image_unchanged() {
        let mut img = RgbImage::from_pixel(6, 4, Rgb([80, 120, 160]));
        let before = img.clone();
        sharpen(&mut img, 2.0);
        assert_eq!(img, before);
    }

    #[test]
    fn unit_factor_is_identity() {
        let mut img = spot();
        let before = img.clone();
        sharpen(&mut img, 1.0);
        assert_eq!(img, before);
    }

    #[test]
    fn sharpen_boosts_peak() {
        let mut img = spot();
        sharpen(&mut img, 2.0);
        // smooth(centre) = (8*100 + 5*200) / 13 = 138.46
        assert!(img.get_pixel(2, 2).0[0] > 250);
        assert!(img.get_pixel(1, 2).0[0] < 100);
        // Border copied, so unchanged.
        assert_eq!(img.get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn tiny_image_passthrough() {
        let img = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        assert_eq!(convolve(&img, &Kernel3::SMOOTH), img);
    }
}
