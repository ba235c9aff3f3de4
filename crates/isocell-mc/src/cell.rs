use isocell_geom::Vec3;

use crate::constants::CORNER_COUNT;
use crate::tables::CORNER_OFFSETS;

/// One cube of the sampled field: a position and a sample per corner.
///
/// Corners must follow the order documented in [`crate::tables`]; the case
/// tables assume it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridCell {
    pub positions: [Vec3; CORNER_COUNT],
    pub samples: [f32; CORNER_COUNT],
}

impl GridCell {
    #[inline]
    pub const fn new(positions: [Vec3; CORNER_COUNT], samples: [f32; CORNER_COUNT]) -> Self {
        Self { positions, samples }
    }

    /// Builds a cell by asking `corner` for the position and sample of each unit
    /// offset in [`CORNER_OFFSETS`] order.
    pub fn from_fn<F>(mut corner: F) -> Self
    where
        F: FnMut([u8; 3]) -> (Vec3, f32),
    {
        let mut cell = GridCell::default();
        for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
            let (p, v) = corner(*offset);
            cell.positions[i] = p;
            cell.samples[i] = v;
        }
        cell
    }

    /// Axis-aligned cube of edge `size` anchored at `origin`.
    pub fn cube(origin: Vec3, size: f32, samples: [f32; CORNER_COUNT]) -> Self {
        let mut i = 0;
        Self::from_fn(|[dx, dy, dz]| {
            let p = origin + Vec3::new(dx as f32, dy as f32, dz as f32) * size;
            let v = samples[i];
            i += 1;
            (p, v)
        })
    }
}

/// Output triangle. Vertex order carries the winding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Triangle {
    pub p: [Vec3; 3],
}

impl Triangle {
    #[inline]
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { p: [a, b, c] }
    }

    /// Unit face normal `(b - a) x (c - a)`; zero for degenerate triangles.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.p;
        (b - a).cross(c - a).normalized()
    }

    #[inline]
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.p;
        0.5 * (b - a).cross(c - a).length()
    }
}
