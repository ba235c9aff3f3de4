//! Scalar fields sampled by the grid sweep, plus their TOML configuration.
#![forbid(unsafe_code)]

use isocell_geom::Vec3;

pub mod config;
pub mod sphere;
pub mod terrain;
pub mod tiles;

pub use config::{FieldConfig, FieldKind, GridConfig, load_field_config};
pub use sphere::SphereField;
pub use terrain::TerrainField;
pub use tiles::TilesField;

/// A density function over world space.
///
/// Empty space samples below [`ScalarField::iso_level`]; solid material samples at or
/// above it. Implementations must be pure: the same point always yields the same value.
pub trait ScalarField: Send + Sync {
    fn sample(&self, p: Vec3) -> f32;

    /// Threshold the field is meant to be polygonized at.
    fn iso_level(&self) -> f32 {
        0.0
    }

    /// Short label for logs.
    fn name(&self) -> &'static str {
        "field"
    }
}

impl<F> ScalarField for F
where
    F: Fn(Vec3) -> f32 + Send + Sync,
{
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        self(p)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
