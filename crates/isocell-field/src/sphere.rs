use isocell_geom::Vec3;

use crate::ScalarField;

/// Solid ball: positive inside, negative outside, zero on the shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereField {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereField {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Default for SphereField {
    fn default() -> Self {
        Self::new(Vec3::splat(25.0), 25.0)
    }
}

impl ScalarField for SphereField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        self.radius - (p - self.center).length()
    }

    fn name(&self) -> &'static str {
        "sphere"
    }
}
