//! 8-bit pixel helpers shared by the operations.

/// Rounds and clamps a float sample into the 8-bit range.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// ITU-R 601 luma of an 8-bit RGB triple, rounded to 8 bits.
///
/// Integer form `(19595 R + 38470 G + 7471 B + 2^15) >> 16`, the usual
/// RGB-to-grayscale projection for photos.
#[inline]
pub fn luma(rgb: [u8; 3]) -> u8 {
    let sum = rgb[0] as u32 * 19595 + rgb[1] as u32 * 38470 + rgb[2] as u32 * 7471 + 0x8000;
    (sum >> 16) as u8
}

/// Rec.709 relative luminance of an 8-bit RGB triple, unrounded (0-255).
#[inline]
pub fn luminance_709(rgb: [u8; 3]) -> f64 {
    0.2126 * rgb[0] as f64 + 0.7152 * rgb[1] as f64 + 0.0722 * rgb[2] as f64
}

/// `degenerate + (sample - degenerate) * factor`, rounded and clamped.
///
/// Factor 0 returns the degenerate value, factor 1 the sample, larger
/// factors extrapolate away from the degenerate value.
#[inline]
pub fn enhance(sample: u8, degenerate: f32, factor: f32) -> u8 {
    to_u8(degenerate + (sample as f32 - degenerate) * factor)
}

/// Linear mix `a * (1 - t) + b * t`, rounded.
#[inline]
pub fn lerp(a: u8, b: u8, t: f32) -> u8 {
    to_u8(a as f32 + (b as f32 - a as f32) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_extremes() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([255, 0, 0]), 76);
        assert_eq!(luma([0, 255, 0]), 150);
        assert_eq!(luma([0, 0, 255]), 29);
    }

    #[test]
    fn clamping() {
        assert_eq!(to_u8(-3.0), 0);
        assert_eq!(to_u8(300.0), 255);
        assert_eq!(to_u8(127.5), 128);
        assert_eq!(to_u8(f32::NAN), 0);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(10, 200, 0.0), 10);
        assert_eq!(lerp(10, 200, 1.0), 200);
        assert_eq!(lerp(0, 100, 0.5), 50);
    }
}
