//! Fixtures for the end-to-end tests.
//!
//! Everything is synthetic: LUT files and images are generated into
//! temporary directories that disappear with the fixture.

use std::path::{Path, PathBuf};

use grade_lut::{Lut3D, cube};
use grade_pipeline::{Pipeline, PipelineConfig};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// A temporary LUT library plus a scratch area for images and outputs.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Empty workspace with a `luts/` directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("luts")).expect("create luts dir");
        Self { dir }
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// LUT library root.
    pub fn lut_root(&self) -> PathBuf {
        self.path().join("luts")
    }

    /// Output directory used by [`Workspace::config`].
    pub fn output_dir(&self) -> PathBuf {
        self.path().join("out")
    }

    /// Writes `lut` as `luts/<rel>`; `rel` may contain subdirectories.
    pub fn add_lut(&self, rel: &str, lut: &Lut3D) -> PathBuf {
        let path = self.lut_root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create lut subdir");
        }
        cube::write_3d(&path, lut).expect("write cube");
        path
    }

    /// Writes raw text as `luts/<rel>`.
    pub fn add_raw_lut(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.lut_root().join(rel);
        std::fs::write(&path, text).expect("write raw lut");
        path
    }

    /// Saves `image` under the workspace root.
    pub fn add_image(&self, name: &str, image: &RgbImage) -> PathBuf {
        let path = self.path().join(name);
        image.save(&path).expect("save image");
        path
    }

    /// Default configuration over this workspace.
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            lut_root: self.lut_root(),
            output_dir: self.output_dir(),
            ..Default::default()
        }
    }

    /// Pipeline over this workspace, indexed now.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.config()).expect("pipeline")
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity LUT of `size`.
pub fn identity_lut(size: usize) -> Lut3D {
    Lut3D::identity(size).expect("identity lut")
}

/// 2-grid negative.
pub fn invert_lut() -> Lut3D {
    Lut3D::from_fn(2, |r, g, b| [1.0 - r, 1.0 - g, 1.0 - b])
}

/// Warm look: lifts red, pulls blue. Non-linear in red.
pub fn warm_lut(size: usize) -> Lut3D {
    Lut3D::from_fn(size, |r, g, b| [r.sqrt(), g, b * 0.8])
}

/// Single-value image.
pub fn flat(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Black/white checkerboard with square cells of `cell` pixels.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    let cell = cell.max(1);
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Every channel ramps over the image; covers most code values.
pub fn color_ramp(width: u32, height: u32) -> RgbImage {
    let w = width.max(2) - 1;
    let h = height.max(2) - 1;
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / w) as u8,
            (y * 255 / h) as u8,
            ((x + y) * 255 / (w + h)) as u8,
        ])
    })
}

/// Largest per-channel difference between two equally sized images.
pub fn max_diff(a: &RgbImage, b: &RgbImage) -> u8 {
    assert_eq!(a.dimensions(), b.dimensions(), "image size mismatch");
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}
