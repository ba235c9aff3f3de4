//! Shared constants for isocell-mesh.

/// Vertex budget of a single build when the caller does not pick one.
pub const DEFAULT_VERTEX_CAPACITY: usize = 1_000_000;

// Shading endpoints: steep faces read as rock, flat tops as grass.
pub(crate) const ROCK_RGB: [f32; 3] = [0.2157, 0.1451, 0.1451];
pub(crate) const GRASS_RGB: [f32; 3] = [0.2784, 0.3529, 0.1882];
pub(crate) const UP_JITTER: f32 = 0.2; // sideways wobble of the "up" axis per triangle
pub(crate) const BRIGHTNESS_JITTER: f32 = 0.1; // per-vertex additive grey
pub(crate) const OPAQUE_ALPHA: u8 = 255;

/// Upper bound on x-slabs per parallel build; keeps slab overhead small on wide grids.
pub(crate) const MAX_SLABS: usize = 64;
