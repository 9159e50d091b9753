//! 3D LUT application on 8-bit images.
//!
//! Samples are mapped to [0, 1], looked up through the LUT's
//! interpolator and scaled back with rounding.
//!
//! When the `parallel` feature is enabled, rows are processed with rayon.

use grade_lut::Lut3D;
use image::RgbImage;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::pixel::to_u8;

#[inline]
fn map_pixel(lut: &Lut3D, px: &mut [u8]) {
    let out = lut.apply([
        px[0] as f32 / 255.0,
        px[1] as f32 / 255.0,
        px[2] as f32 / 255.0,
    ]);
    px[0] = to_u8(out[0] * 255.0);
    px[1] = to_u8(out[1] * 255.0);
    px[2] = to_u8(out[2] * 255.0);
}

/// Applies `lut` to every pixel of `image` in place.
pub fn apply_lut_in_place(image: &mut RgbImage, lut: &Lut3D) {
    let row_len = image.width() as usize * 3;
    if row_len == 0 {
        return;
    }
    trace!(
        width = image.width(),
        height = image.height(),
        lut_size = lut.size,
        "apply lut"
    );

    let buf: &mut [u8] = image;

    #[cfg(feature = "parallel")]
    buf.par_chunks_mut(row_len).for_each(|row| {
        for px in row.chunks_exact_mut(3) {
            map_pixel(lut, px);
        }
    });

    #[cfg(not(feature = "parallel"))]
    for px in buf.chunks_exact_mut(3) {
        map_pixel(lut, px);
    }
}

/// Returns a copy of `image` with `lut` applied.
pub fn apply_lut(image: &RgbImage, lut: &Lut3D) -> RgbImage {
    let mut out = image.clone();
    apply_lut_in_place(&mut out, lut);
    out
}
