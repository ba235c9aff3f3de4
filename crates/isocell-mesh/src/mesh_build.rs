use isocell_geom::Vec3;
use isocell_mc::Triangle;

use crate::constants::DEFAULT_VERTEX_CAPACITY;
use crate::shade::{face_tint, vertex_rgba};

/// Flat triangle soup: three vertices per triangle, no index buffer.
///
/// `pos` and `norm` hold x,y,z per vertex, `col` holds rgba per vertex. Triangles that
/// would push the vertex count past `capacity` are dropped and counted instead.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub col: Vec<u8>,
    capacity: usize,
    dropped_triangles: usize,
}

impl Default for MeshBuild {
    fn default() -> Self {
        Self::with_vertex_capacity(DEFAULT_VERTEX_CAPACITY)
    }
}

impl MeshBuild {
    pub fn with_vertex_capacity(capacity: usize) -> Self {
        Self {
            pos: Vec::new(),
            norm: Vec::new(),
            col: Vec::new(),
            capacity,
            dropped_triangles: 0,
        }
    }

    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    #[inline]
    pub fn dropped_triangles(&self) -> usize {
        self.dropped_triangles
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    #[inline]
    fn has_room(&self) -> bool {
        self.vertex_count() + 3 <= self.capacity
    }

    /// Clears all arrays but retains capacity for reuse across builds.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.col.clear();
        self.dropped_triangles = 0;
    }

    /// Pre-reserve room for `n` more triangles, never beyond the vertex budget.
    #[inline]
    pub fn reserve_triangles(&mut self, n: usize) {
        let room = self.capacity.saturating_sub(self.vertex_count()) / 3;
        let n = n.min(room);
        self.pos.reserve(n * 9);
        self.norm.reserve(n * 9);
        self.col.reserve(n * 12);
    }

    /// Appends `tri` with a flat face normal and shading colour.
    /// Returns `false` when the triangle was dropped for lack of room.
    pub fn add_triangle(&mut self, tri: &Triangle) -> bool {
        if !self.has_room() {
            self.dropped_triangles += 1;
            return false;
        }
        let n = tri.normal();
        let [a, b, c] = tri.p;
        let tint = face_tint(n, (a + b + c) / 3.0);
        for p in tri.p {
            self.pos.extend_from_slice(&[p.x, p.y, p.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.col.extend_from_slice(&vertex_rgba(tint, p));
        }
        true
    }

    /// Appends every triangle of `other` in order, honouring this buffer's budget.
    /// Triangles `other` already dropped stay counted as dropped.
    pub fn append(&mut self, other: &MeshBuild) {
        let room = self.capacity.saturating_sub(self.vertex_count()) / 3;
        let take = other.triangle_count().min(room);
        self.pos.extend_from_slice(&other.pos[..take * 9]);
        self.norm.extend_from_slice(&other.norm[..take * 9]);
        self.col.extend_from_slice(&other.col[..take * 12]);
        self.dropped_triangles += other.triangle_count() - take + other.dropped_triangles;
    }

    /// Positions of triangle `i`.
    pub fn triangle(&self, i: usize) -> Triangle {
        let v = |k: usize| {
            let o = (i * 3 + k) * 3;
            Vec3::new(self.pos[o], self.pos[o + 1], self.pos[o + 2])
        };
        Triangle::new(v(0), v(1), v(2))
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(|i| self.triangle(i))
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
    pub fn colors(&self) -> &[u8] {
        &self.col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(y: f32) -> Triangle {
        Triangle::new(
            Vec3::new(0.0, y, 0.0),
            Vec3::new(0.0, y, 1.0),
            Vec3::new(1.0, y, 0.0),
        )
    }

    #[test]
    fn add_triangle_fills_all_streams() {
        let mut m = MeshBuild::default();
        assert!(m.add_triangle(&tri(2.0)));
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.triangle_count(), 1);
        assert_eq!(m.norm.len(), 9);
        assert_eq!(m.col.len(), 12);
        // (0,0,1) x (1,0,0) = (0,1,0)
        assert_eq!(&m.norm[..3], &[0.0, 1.0, 0.0]);
        assert_eq!(m.triangle(0), tri(2.0));
    }

    #[test]
    fn capacity_drops_and_counts() {
        let mut m = MeshBuild::with_vertex_capacity(7);
        assert!(m.add_triangle(&tri(0.0)));
        assert!(m.add_triangle(&tri(1.0)));
        assert!(!m.add_triangle(&tri(2.0)));
        assert_eq!(m.triangle_count(), 2);
        assert_eq!(m.dropped_triangles(), 1);

        m.clear_keep_capacity();
        assert!(m.is_empty());
        assert_eq!(m.dropped_triangles(), 0);
        assert!(m.pos.capacity() >= 6);
    }

    #[test]
    fn append_keeps_order_and_budget() {
        let mut a = MeshBuild::with_vertex_capacity(9);
        a.add_triangle(&tri(0.0));
        let mut b = MeshBuild::with_vertex_capacity(9);
        for y in 1..4 {
            b.add_triangle(&tri(y as f32));
        }
        assert_eq!(b.dropped_triangles(), 0);
        a.append(&b);
        assert_eq!(a.triangle_count(), 3);
        assert_eq!(a.dropped_triangles(), 1);
        let ys: Vec<f32> = a.triangles().map(|t| t.p[0].y).collect();
        assert_eq!(ys, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn reserve_is_capped_by_budget() {
        let mut m = MeshBuild::with_vertex_capacity(30);
        m.reserve_triangles(1_000_000);
        assert!(m.pos.capacity() < 1_000);
    }
}
