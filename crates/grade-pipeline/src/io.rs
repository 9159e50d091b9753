//! Image loading and saving.

use std::path::Path;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use tracing::trace;

use crate::{GradeError, GradeResult};

/// Decodes `path` to 8-bit RGB, honouring the EXIF orientation tag.
pub fn load_rgb(path: impl AsRef<Path>) -> GradeResult<RgbImage> {
    let path = path.as_ref();
    let err = |e: &dyn std::fmt::Display| GradeError::image_io(path, e);

    let reader = ImageReader::open(path)
        .map_err(|e| err(&e))?
        .with_guessed_format()
        .map_err(|e| err(&e))?;
    let mut decoder = reader.into_decoder().map_err(|e| err(&e))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| err(&e))?;
    image.apply_orientation(orientation);

    trace!(path = %path.display(), width = image.width(), height = image.height(), "loaded image");
    Ok(image.into_rgb8())
}

/// Encodes `image` to `path`, format chosen by extension.
///
/// Missing parent directories are created.
pub fn save_rgb(image: &RgbImage, path: impl AsRef<Path>) -> GradeResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(path)
        .map_err(|e| GradeError::image_io(path, e))?;
    trace!(path = %path.display(), "saved image");
    Ok(())
}
