//! Single-cell Marching Cubes evaluation.

use isocell_geom::Vec3;

use crate::cell::{GridCell, Triangle};
use crate::constants::{EDGE_COUNT, FLAT_EDGE_EPSILON, MAX_TRIANGLES, TRI_SENTINEL};
use crate::tables::{EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// 8-bit case index: bit `i` is set when `samples[i] < iso_level`.
#[inline]
pub fn case_index(cell: &GridCell, iso_level: f32) -> u8 {
    let mut index = 0u8;
    for (i, &v) in cell.samples.iter().enumerate() {
        if v < iso_level {
            index |= 1 << i;
        }
    }
    index
}

/// Number of triangles the table emits for `case`.
#[inline]
pub fn case_triangle_count(case: u8) -> usize {
    TRI_TABLE[case as usize]
        .iter()
        .take_while(|&&e| e != TRI_SENTINEL)
        .count()
        / 3
}

/// Point where the field crosses `iso_level` between `(p0, v0)` and `(p1, v1)`.
///
/// `t = (iso_level - v0) / (v1 - v0)` clamped to `[0, 1]`. A flat edge
/// (`|v1 - v0| < FLAT_EDGE_EPSILON`) resolves to the midpoint.
#[inline]
pub fn interpolate_edge(p0: Vec3, p1: Vec3, v0: f32, v1: f32, iso_level: f32) -> Vec3 {
    let denom = v1 - v0;
    // Negated compare so a NaN difference also lands on the midpoint.
    if !(denom.abs() >= FLAT_EDGE_EPSILON) {
        return p0.lerp(p1, 0.5);
    }
    let t = ((iso_level - v0) / denom).clamp(0.0, 1.0);
    p0.lerp(p1, t)
}

/// Per-call memo of edge crossings. Each slot is filled at most once.
struct EdgeCache {
    slots: [Option<Vec3>; EDGE_COUNT],
    #[cfg(test)]
    evaluations: usize,
}

impl EdgeCache {
    #[inline]
    fn new() -> Self {
        Self {
            slots: [None; EDGE_COUNT],
            #[cfg(test)]
            evaluations: 0,
        }
    }

    #[inline]
    fn get(&mut self, edge: usize, cell: &GridCell, iso_level: f32) -> Vec3 {
        if let Some(p) = self.slots[edge] {
            return p;
        }
        #[cfg(test)]
        {
            self.evaluations += 1;
        }
        let p = edge_crossing(cell, edge, iso_level);
        self.slots[edge] = Some(p);
        p
    }
}

// Always interpolates from the inside corner toward the outside corner, so two
// cells that share an edge derive the same bits for its crossing.
#[inline]
fn edge_crossing(cell: &GridCell, edge: usize, iso_level: f32) -> Vec3 {
    let [a, b] = EDGE_CORNERS[edge];
    let (a, b) = (a as usize, b as usize);
    let (inner, outer) = if cell.samples[a] < iso_level {
        (a, b)
    } else {
        (b, a)
    };
    interpolate_edge(
        cell.positions[inner],
        cell.positions[outer],
        cell.samples[inner],
        cell.samples[outer],
        iso_level,
    )
}

fn to_polygon_cached(
    cell: &GridCell,
    iso_level: f32,
    out: &mut [Triangle; MAX_TRIANGLES],
    cache: &mut EdgeCache,
) -> usize {
    let case = case_index(cell, iso_level) as usize;
    if EDGE_TABLE[case] == 0 {
        return 0;
    }

    let row = &TRI_TABLE[case];
    let mut count = 0;
    for tri in row.chunks_exact(3) {
        if tri[0] == TRI_SENTINEL {
            break;
        }
        out[count] = Triangle::new(
            cache.get(tri[0] as usize, cell, iso_level),
            cache.get(tri[1] as usize, cell, iso_level),
            cache.get(tri[2] as usize, cell, iso_level),
        );
        count += 1;
    }
    count
}

/// Polygonizes one cell into `out`, returning how many triangles were written.
///
/// Triangles land in `out[..count]`; later slots are left as they were. Returns 0
/// when every corner sits on the same side of `iso_level`. Samples must be finite;
/// non-finite input yields unspecified (but memory-safe) geometry.
pub fn to_polygon(cell: &GridCell, iso_level: f32, out: &mut [Triangle; MAX_TRIANGLES]) -> usize {
    let mut cache = EdgeCache::new();
    to_polygon_cached(cell, iso_level, out, &mut cache)
}

/// Allocating convenience over [`to_polygon`].
pub fn polygonize(cell: &GridCell, iso_level: f32) -> Vec<Triangle> {
    let mut tris = [Triangle::default(); MAX_TRIANGLES];
    let n = to_polygon(cell, iso_level, &mut tris);
    tris[..n].to_vec()
}
