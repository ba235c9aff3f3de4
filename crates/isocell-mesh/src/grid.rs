use isocell_field::{FieldConfig, ScalarField};
use isocell_geom::{Aabb, Vec3};
use isocell_mc::GridCell;
use isocell_mc::tables::CORNER_OFFSETS;

/// Regular lattice of `dims` cells, each `cell_size` wide, starting at `origin`.
///
/// Lattice points are computed from integer indices, never by accumulating steps,
/// so two cells that share a corner see the same position bits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    pub origin: Vec3,
    pub dims: [usize; 3],
    pub cell_size: f32,
}

impl GridSpec {
    pub const fn new(origin: Vec3, dims: [usize; 3], cell_size: f32) -> Self {
        Self {
            origin,
            dims,
            cell_size,
        }
    }

    pub fn from_config(cfg: &FieldConfig) -> Self {
        Self::new(Vec3::from(cfg.grid.origin), cfg.grid.dims, cfg.cell_size())
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Lattice points per axis (`dims + 1`).
    #[inline]
    pub fn point_dims(&self) -> [usize; 3] {
        [self.dims[0] + 1, self.dims[1] + 1, self.dims[2] + 1]
    }

    #[inline]
    pub fn lattice_point(&self, i: usize, j: usize, k: usize) -> Vec3 {
        let s = self.cell_size;
        Vec3::new(
            self.origin.x + i as f32 * s,
            self.origin.y + j as f32 * s,
            self.origin.z + k as f32 * s,
        )
    }

    /// Samples `field` at the 8 corners of cell `(i, j, k)` in polygonizer corner order.
    pub fn cell_at<F: ScalarField + ?Sized>(&self, i: usize, j: usize, k: usize, field: &F) -> GridCell {
        GridCell::from_fn(|[dx, dy, dz]| {
            let p = self.lattice_point(i + dx as usize, j + dy as usize, k + dz as usize);
            (p, field.sample(p))
        })
    }

    pub fn bounds(&self) -> Aabb {
        let [nx, ny, nz] = self.dims;
        Aabb::new(self.origin, self.lattice_point(nx, ny, nz))
    }
}

/// Field samples for lattice columns `x0..=x1` of a grid, laid out x-major then y then z.
pub(crate) struct SampleBlock {
    x0: usize,
    ny: usize,
    nz: usize,
    values: Vec<f32>,
}

impl SampleBlock {
    pub(crate) fn sample<F: ScalarField + ?Sized>(grid: &GridSpec, field: &F, x0: usize, x1: usize) -> Self {
        let [_, ny, nz] = grid.point_dims();
        let mut values = Vec::with_capacity((x1 - x0 + 1) * ny * nz);
        for i in x0..=x1 {
            for j in 0..ny {
                for k in 0..nz {
                    values.push(field.sample(grid.lattice_point(i, j, k)));
                }
            }
        }
        Self { x0, ny, nz, values }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[((i - self.x0) * self.ny + j) * self.nz + k]
    }

    /// Same cell as [`GridSpec::cell_at`], read from the cached samples.
    #[inline]
    pub(crate) fn cell(&self, grid: &GridSpec, i: usize, j: usize, k: usize) -> GridCell {
        let mut cell = GridCell::default();
        for (c, [dx, dy, dz]) in CORNER_OFFSETS.iter().enumerate() {
            let (ci, cj, ck) = (i + *dx as usize, j + *dy as usize, k + *dz as usize);
            cell.positions[c] = grid.lattice_point(ci, cj, ck);
            cell.samples[c] = self.get(ci, cj, ck);
        }
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_bounds() {
        let g = GridSpec::new(Vec3::new(1.0, 2.0, 3.0), [4, 2, 3], 0.5);
        assert_eq!(g.cell_count(), 24);
        assert_eq!(g.point_dims(), [5, 3, 4]);
        let b = g.bounds();
        assert_eq!(b.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.max, Vec3::new(3.0, 3.0, 4.5));
    }

    #[test]
    fn cell_at_follows_corner_order() {
        let g = GridSpec::new(Vec3::ZERO, [2, 2, 2], 1.0);
        let field = |p: Vec3| p.x * 100.0 + p.y * 10.0 + p.z;
        let c = g.cell_at(1, 0, 1, &field);
        assert_eq!(c.positions[0], Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(c.positions[1], Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(c.positions[2], Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(c.positions[3], Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(c.positions[6], Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(c.samples[6], 212.0);
    }

    #[test]
    fn cached_block_matches_direct_sampling() {
        let g = GridSpec::new(Vec3::new(-1.0, 0.5, 2.0), [3, 2, 2], 0.75);
        let field = |p: Vec3| (p.x * 1.3).sin() + p.y * p.z;
        let block = SampleBlock::sample(&g, &field, 1, 3);
        for i in 1..3 {
            for j in 0..2 {
                for k in 0..2 {
                    assert_eq!(block.cell(&g, i, j, k), g.cell_at(i, j, k, &field));
                }
            }
        }
    }
}
