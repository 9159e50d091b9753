//! LUT stage: resolve, load through the cache, mix and blend.
//!
//! The primary LUT is applied to the tone-adjusted image. A secondary
//! LUT is applied to the same tone-adjusted image (not to the primary
//! result) and mixed in by `mix`. Finally the LUT result is blended over
//! the tone-adjusted image by `intensity`.

use std::path::PathBuf;
use std::sync::Arc;

use grade_lut::{Lut3D, LutCache, LutCatalog, MatchKind, ResolvedLut};
use grade_ops::{composite, lut};
use image::RgbImage;
use tracing::{debug, warn};

use crate::{GradeError, GradeResult};

/// Inputs of the LUT stage.
#[derive(Debug, Clone, Copy)]
pub struct LutRequest<'a> {
    /// Primary LUT name or path.
    pub primary: &'a str,
    /// Optional secondary LUT name or path.
    pub secondary: Option<&'a str>,
    /// Weight of the secondary result, [0, 1].
    pub mix: f32,
    /// Weight of the LUT result over the source, [0, 1].
    pub intensity: f32,
}

/// A LUT that took part in the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedLut {
    /// Reference as given in the plan.
    pub requested: String,
    /// Resolved file path.
    pub path: PathBuf,
    /// How the reference was resolved.
    pub matched: MatchKind,
}

/// Result of [`LutStage::run`].
#[derive(Debug)]
pub enum LutOutcome {
    /// LUTs applied.
    Applied {
        /// Graded image.
        image: RgbImage,
        /// The primary LUT.
        primary: AppliedLut,
        /// The secondary LUT, if it was used.
        secondary: Option<AppliedLut>,
        /// Degradations such as an unusable secondary LUT.
        warnings: Vec<String>,
    },
    /// Primary LUT could not be resolved; the source is returned as-is.
    NotFound {
        /// Unmodified input.
        image: RgbImage,
        /// Reference as given in the plan.
        requested: String,
    },
}

/// Borrowed view of the catalog and cache used for one run.
pub struct LutStage<'a> {
    catalog: &'a LutCatalog,
    cache: &'a LutCache,
}

impl<'a> LutStage<'a> {
    /// Creates a stage over a catalog and a cache.
    pub fn new(catalog: &'a LutCatalog, cache: &'a LutCache) -> Self {
        Self { catalog, cache }
    }

    fn load(&self, requested: &str) -> GradeResult<(Arc<Lut3D>, AppliedLut)> {
        let ResolvedLut { path, matched } = self.catalog.resolve(requested)?;
        let lut = self
            .cache
            .get_or_load(&path)
            .map_err(|e| GradeError::lut(&path, e))?;
        Ok((
            lut,
            AppliedLut {
                requested: requested.to_string(),
                path,
                matched,
            },
        ))
    }

    /// Runs the stage on `source`.
    ///
    /// An unresolvable primary returns [`LutOutcome::NotFound`]; a primary
    /// that resolves but fails to parse is an error. Problems with the
    /// secondary LUT only drop the mix.
    pub fn run(&self, source: RgbImage, request: LutRequest<'_>) -> GradeResult<LutOutcome> {
        let (primary_lut, primary) = match self.load(request.primary) {
            Ok(found) => found,
            Err(GradeError::NotFound(_)) => {
                warn!(lut = %request.primary, "LUT not found, skipping LUT stage");
                return Ok(LutOutcome::NotFound {
                    image: source,
                    requested: request.primary.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let mut warnings = Vec::new();
        let mut graded = lut::apply_lut(&source, &primary_lut);
        debug!(lut = %primary.path.display(), "applied primary LUT");

        let mut secondary = None;
        if let Some(name) = request.secondary.filter(|_| request.mix > 0.0) {
            match self.load(name) {
                Ok((secondary_lut, applied)) => {
                    let other = lut::apply_lut(&source, &secondary_lut);
                    graded = composite::blend(&graded, &other, request.mix)
                        .map_err(|e| GradeError::InvalidPlan(e.to_string()))?;
                    debug!(lut = %applied.path.display(), mix = request.mix, "mixed secondary LUT");
                    secondary = Some(applied);
                }
                Err(e) => {
                    warn!(lut = %name, error = %e, "secondary LUT unusable, using primary only");
                    warnings.push(format!("secondary LUT skipped: {e}"));
                }
            }
        }

        let image = if request.intensity < 1.0 {
            composite::blend(&source, &graded, request.intensity)
                .map_err(|e| GradeError::InvalidPlan(e.to_string()))?
        } else {
            graded
        };

        Ok(LutOutcome::Applied {
            image,
            primary,
            secondary,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grade_lut::cube;
    use image::Rgb;
    use std::path::Path;

    fn write_lut(dir: &Path, name: &str, lut: &Lut3D) {
        cube::write_3d(dir.join(name), lut).unwrap();
    }

    fn invert() -> Lut3D {
        Lut3D::from_fn(2, |r, g, b| [1.0 - r, 1.0 - g, 1.0 - b])
    }

    fn setup() -> (tempfile::TempDir, LutCatalog) {
        let dir = tempfile::tempdir().unwrap();
        write_lut(dir.path(), "identity.cube", &Lut3D::identity(2).unwrap());
        write_lut(dir.path(), "invert.cube", &invert());
        std::fs::write(dir.path().join("broken.cube"), "LUT_3D_SIZE 2\n0 0 0\n").unwrap();
        let catalog = LutCatalog::open(dir.path());
        (dir, catalog)
    }

    fn source() -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb([200, 100, 0]))
    }

    #[test]
    fn primary_only() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "invert.cube",
            secondary: None,
            mix: 0.0,
            intensity: 1.0,
        };
        let LutOutcome::Applied { image, primary, .. } = stage.run(source(), request).unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(image.get_pixel(0, 0).0, [55, 155, 255]);
        assert_eq!(primary.matched, MatchKind::Exact);
    }

    #[test]
    fn secondary_mixes_from_source() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "identity.cube",
            secondary: Some("invert.cube"),
            mix: 0.5,
            intensity: 1.0,
        };
        let LutOutcome::Applied { image, secondary, .. } = stage.run(source(), request).unwrap()
        else {
            panic!("expected applied");
        };
        assert!(secondary.is_some());
        // (200 + 55) / 2, (100 + 155) / 2, (0 + 255) / 2
        assert_eq!(image.get_pixel(1, 1).0, [128, 128, 128]);
    }

    #[test]
    fn intensity_zero_returns_source() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "invert.cube",
            secondary: None,
            mix: 0.0,
            intensity: 0.0,
        };
        let LutOutcome::Applied { image, .. } = stage.run(source(), request).unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(image, source());
    }

    #[test]
    fn missing_primary_passes_through() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "zzzzzzzzzz.cube",
            secondary: None,
            mix: 0.0,
            intensity: 1.0,
        };
        match stage.run(source(), request).unwrap() {
            LutOutcome::NotFound { image, requested } => {
                assert_eq!(image, source());
                assert_eq!(requested, "zzzzzzzzzz.cube");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn corrupt_primary_is_error() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "broken.cube",
            secondary: None,
            mix: 0.0,
            intensity: 1.0,
        };
        assert!(matches!(
            stage.run(source(), request),
            Err(GradeError::CorruptLut { .. })
        ));
    }

    #[test]
    fn corrupt_secondary_degrades() {
        let (_dir, catalog) = setup();
        let cache = LutCache::new(4);
        let stage = LutStage::new(&catalog, &cache);
        let request = LutRequest {
            primary: "invert.cube",
            secondary: Some("broken.cube"),
            mix: 0.5,
            intensity: 1.0,
        };
        let LutOutcome::Applied { image, secondary, warnings, .. } =
            stage.run(source(), request).unwrap()
        else {
            panic!("expected applied");
        };
        assert!(secondary.is_none());
        assert_eq!(warnings.len(), 1);
        assert_eq!(image.get_pixel(0, 0).0, [55, 155, 255]);
    }
}
