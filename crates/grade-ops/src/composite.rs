//! Image mixing.

use image::RgbImage;

use crate::pixel::lerp;
use crate::{OpsError, OpsResult};

fn check_size(a: &RgbImage, b: &RgbImage) -> OpsResult<()> {
    if a.dimensions() != b.dimensions() {
        return Err(OpsError::SizeMismatch(format!(
            "{}x{} vs {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    Ok(())
}

/// Per-pixel `base * (1 - amount) + layer * amount`.
///
/// `amount` is clamped to [0, 1]; the endpoints return exact copies.
pub fn blend(base: &RgbImage, layer: &RgbImage, amount: f32) -> OpsResult<RgbImage> {
    check_size(base, layer)?;
    let t = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };

    if t <= 0.0 {
        return Ok(base.clone());
    }
    if t >= 1.0 {
        return Ok(layer.clone());
    }

    let mut out = base.clone();
    for (o, &l) in out.iter_mut().zip(layer.as_raw()) {
        *o = lerp(*o, l, t);
    }
    Ok(out)
}
