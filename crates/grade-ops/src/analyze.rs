//! Image statistics and log/standard classification.
//!
//! Classification projects the image to 8-bit luma and compares the
//! population standard deviation with a threshold: flat, low-contrast
//! (log) footage falls below it, already graded photos above.

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::pixel::{luma, luminance_709};

/// Luma standard deviation below which an image counts as log footage.
pub const LOG_STDDEV_THRESHOLD: f32 = 30.0;

/// Tonal class of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageClass {
    /// Flat, low-contrast camera output.
    Log,
    /// Normal contrast photo.
    Standard,
}

impl ImageClass {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageClass::Log => "log",
            ImageClass::Standard => "standard",
        }
    }
}

impl fmt::Display for ImageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Population mean and standard deviation of a sample stream.
fn mean_stddev(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut n, mut sum, mut sum_sq) = (0u64, 0.0f64, 0.0f64);
    for v in values {
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    let var = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, var.sqrt())
}

/// Population standard deviation of the 8-bit luma channel.
pub fn luma_stddev(image: &RgbImage) -> f32 {
    mean_stddev(image.pixels().map(|p| luma(p.0) as f64)).1 as f32
}

/// Classifies with the default threshold; also returns the raw stddev.
pub fn classify(image: &RgbImage) -> (ImageClass, f32) {
    classify_with_threshold(image, LOG_STDDEV_THRESHOLD)
}

/// Classifies against a custom threshold.
pub fn classify_with_threshold(image: &RgbImage, threshold: f32) -> (ImageClass, f32) {
    let stddev = luma_stddev(image);
    let class = if stddev < threshold {
        ImageClass::Log
    } else {
        ImageClass::Standard
    };
    (class, stddev)
}

/// Summary statistics used to describe a photo to a planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    /// Mean Rec.709 luminance, 0-255.
    pub brightness: f32,
    /// Standard deviation of the Rec.709 luminance.
    pub contrast: f32,
    /// `r_mean / b_mean`; above 1 is warm, below 1 cool.
    pub wb_ratio: f32,
    /// Mean HSV saturation, 0-255.
    pub saturation: f32,
}

impl ImageStats {
    /// Measures `image`. An empty image yields all zeros.
    pub fn analyze(image: &RgbImage) -> Self {
        let n = image.width() as f64 * image.height() as f64;
        if n == 0.0 {
            return Self {
                brightness: 0.0,
                contrast: 0.0,
                wb_ratio: 0.0,
                saturation: 0.0,
            };
        }

        let (brightness, contrast) = mean_stddev(image.pixels().map(|p| luminance_709(p.0)));

        let (mut r_sum, mut b_sum, mut s_sum) = (0.0f64, 0.0f64, 0.0f64);
        for p in image.pixels() {
            let [r, g, b] = p.0;
            r_sum += r as f64;
            b_sum += b as f64;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max > 0 {
                s_sum += (max - min) as f64 * 255.0 / max as f64;
            }
        }

        Self {
            brightness: brightness as f32,
            contrast: contrast as f32,
            wb_ratio: ((r_sum / n) / (b_sum / n + 1e-5)) as f32,
            saturation: (s_sum / n) as f32,
        }
    }
}
