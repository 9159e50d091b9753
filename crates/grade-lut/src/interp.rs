//! Interpolation methods for LUT evaluation.

/// Interpolation method for 3D LUT evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Trilinear interpolation over the 8 surrounding grid samples.
    #[default]
    Trilinear,

    /// Tetrahedral interpolation.
    ///
    /// Uses 4 of the 8 corners; smoother on gradients near the neutral axis.
    Tetrahedral,
}

impl Interpolation {
    /// Parses a method name (`trilinear`/`linear`, `tetrahedral`/`tetra`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trilinear" | "linear" => Some(Self::Trilinear),
            "tetrahedral" | "tetra" => Some(Self::Tetrahedral),
            _ => None,
        }
    }
}
