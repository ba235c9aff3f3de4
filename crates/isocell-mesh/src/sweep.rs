use std::cell::RefCell;
use std::ops::Range;
use std::time::{Duration, Instant};

use isocell_field::ScalarField;
use isocell_mc::{MAX_TRIANGLES, Triangle, to_polygon};
use rayon::prelude::*;

use crate::constants::MAX_SLABS;
use crate::grid::{GridSpec, SampleBlock};
use crate::mesh_build::MeshBuild;

thread_local! {
    // Triangle count of the last slab built on this thread; seeds the next reserve.
    static LAST_SLAB_TRIS: RefCell<usize> = const { RefCell::new(64) };
}

/// Wall-clock split of one sweep. For parallel sweeps the phases are summed over slabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepTimings {
    pub sample_ms: u32,
    pub mesh_ms: u32,
    pub total_ms: u32,
}

fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn duration_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

struct SlabOut {
    mesh: MeshBuild,
    sample: Duration,
    polygonize: Duration,
}

// Cells x in `xs`, all y and z, in x-then-y-then-z order.
fn sweep_slab<F: ScalarField + ?Sized>(
    field: &F,
    grid: &GridSpec,
    iso_level: f32,
    capacity: usize,
    xs: Range<usize>,
) -> SlabOut {
    let t_sample = Instant::now();
    let block = SampleBlock::sample(grid, field, xs.start, xs.end);
    let sample = t_sample.elapsed();

    let t_poly = Instant::now();
    let mut mesh = MeshBuild::with_vertex_capacity(capacity);
    mesh.reserve_triangles(LAST_SLAB_TRIS.with(|c| *c.borrow()));
    let mut tris = [Triangle::default(); MAX_TRIANGLES];
    let [_, ny, nz] = grid.dims;
    for i in xs {
        for j in 0..ny {
            for k in 0..nz {
                let cell = block.cell(grid, i, j, k);
                let n = to_polygon(&cell, iso_level, &mut tris);
                for t in &tris[..n] {
                    mesh.add_triangle(t);
                }
            }
        }
    }
    LAST_SLAB_TRIS.with(|c| *c.borrow_mut() = mesh.triangle_count().max(64));
    SlabOut {
        mesh,
        sample,
        polygonize: t_poly.elapsed(),
    }
}

fn warn_dropped(mesh: &MeshBuild) {
    if mesh.dropped_triangles() > 0 {
        log::warn!(
            target: "mesh",
            "vertex budget {} reached; dropped {} triangles",
            mesh.vertex_capacity(),
            mesh.dropped_triangles()
        );
    }
}

/// Splits `0..nx` into at most `max_slabs` contiguous, ordered ranges.
pub(crate) fn slab_ranges(nx: usize, max_slabs: usize) -> Vec<Range<usize>> {
    if nx == 0 {
        return Vec::new();
    }
    let slabs = max_slabs.clamp(1, nx);
    let base = nx / slabs;
    let extra = nx % slabs;
    let mut out = Vec::with_capacity(slabs);
    let mut x = 0;
    for s in 0..slabs {
        let w = base + usize::from(s < extra);
        out.push(x..x + w);
        x += w;
    }
    out
}

/// Sequential sweep over every cell of `grid`, x outermost and z innermost.
pub fn build_mesh_timed<F: ScalarField + ?Sized>(
    field: &F,
    grid: &GridSpec,
    iso_level: f32,
    capacity: usize,
) -> (MeshBuild, SweepTimings) {
    let t0 = Instant::now();
    if grid.cell_count() == 0 {
        return (MeshBuild::with_vertex_capacity(capacity), SweepTimings::default());
    }
    let out = sweep_slab(field, grid, iso_level, capacity, 0..grid.dims[0]);
    warn_dropped(&out.mesh);
    let timings = SweepTimings {
        sample_ms: duration_ms(out.sample),
        mesh_ms: duration_ms(out.polygonize),
        total_ms: elapsed_ms(t0),
    };
    log::debug!(
        target: "mesh",
        "sweep {:?} cells -> {} tris in {}ms (sample={}ms mesh={}ms)",
        grid.dims,
        out.mesh.triangle_count(),
        timings.total_ms,
        timings.sample_ms,
        timings.mesh_ms
    );
    (out.mesh, timings)
}

/// Parallel sweep: x-slabs run on the current rayon pool and are concatenated in
/// slab order, giving the same triangle sequence as [`build_mesh_timed`].
pub fn build_mesh_par_timed<F: ScalarField + ?Sized>(
    field: &F,
    grid: &GridSpec,
    iso_level: f32,
    capacity: usize,
) -> (MeshBuild, SweepTimings) {
    let t0 = Instant::now();
    let max_slabs = (rayon::current_num_threads() * 4).min(MAX_SLABS);
    let ranges = slab_ranges(grid.dims[0], max_slabs);
    if ranges.is_empty() || grid.cell_count() == 0 {
        return (MeshBuild::with_vertex_capacity(capacity), SweepTimings::default());
    }
    let slabs: Vec<SlabOut> = ranges
        .into_par_iter()
        .map(|xs| sweep_slab(field, grid, iso_level, capacity, xs))
        .collect();

    let mut mesh = MeshBuild::with_vertex_capacity(capacity);
    mesh.reserve_triangles(slabs.iter().map(|s| s.mesh.triangle_count()).sum());
    let mut sample = Duration::ZERO;
    let mut polygonize = Duration::ZERO;
    for s in &slabs {
        mesh.append(&s.mesh);
        sample += s.sample;
        polygonize += s.polygonize;
    }
    warn_dropped(&mesh);
    let timings = SweepTimings {
        sample_ms: duration_ms(sample),
        mesh_ms: duration_ms(polygonize),
        total_ms: elapsed_ms(t0),
    };
    log::debug!(
        target: "mesh",
        "par sweep {:?} cells in {} slabs -> {} tris in {}ms",
        grid.dims,
        slabs.len(),
        mesh.triangle_count(),
        timings.total_ms
    );
    (mesh, timings)
}

pub fn build_mesh<F: ScalarField + ?Sized>(
    field: &F,
    grid: &GridSpec,
    iso_level: f32,
    capacity: usize,
) -> MeshBuild {
    build_mesh_timed(field, grid, iso_level, capacity).0
}

pub fn build_mesh_par<F: ScalarField + ?Sized>(
    field: &F,
    grid: &GridSpec,
    iso_level: f32,
    capacity: usize,
) -> MeshBuild {
    build_mesh_par_timed(field, grid, iso_level, capacity).0
}
