use isocell_geom::{Aabb, Vec3};

use crate::mesh_build::MeshBuild;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshStats {
    pub triangles: usize,
    pub vertices: usize,
    pub dropped: usize,
    /// `None` for an empty mesh.
    pub bounds: Option<Aabb>,
    pub surface_area: f64,
}

impl MeshStats {
    pub fn of(mesh: &MeshBuild) -> Self {
        let mut bounds: Option<Aabb> = None;
        for p in mesh.pos.chunks_exact(3) {
            let v = Vec3::new(p[0], p[1], p[2]);
            match bounds.as_mut() {
                Some(b) => b.union_point(v),
                None => bounds = Some(Aabb::new(v, v)),
            }
        }
        let surface_area = mesh.triangles().map(|t| f64::from(t.area())).sum();
        Self {
            triangles: mesh.triangle_count(),
            vertices: mesh.vertex_count(),
            dropped: mesh.dropped_triangles(),
            bounds,
            surface_area,
        }
    }
}

impl std::fmt::Display for MeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} triangles, {} vertices, {} dropped, area {:.3}",
            self.triangles, self.vertices, self.dropped, self.surface_area
        )?;
        if let Some(b) = self.bounds {
            write!(
                f,
                ", bounds [{:.3} {:.3} {:.3}]..[{:.3} {:.3} {:.3}]",
                b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isocell_mc::Triangle;

    #[test]
    fn empty_mesh_has_no_bounds() {
        let s = MeshStats::of(&MeshBuild::default());
        assert_eq!(s.triangles, 0);
        assert!(s.bounds.is_none());
        assert_eq!(s.surface_area, 0.0);
    }

    #[test]
    fn area_and_bounds_of_one_triangle() {
        let mut m = MeshBuild::default();
        m.add_triangle(&Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        ));
        let s = MeshStats::of(&m);
        assert_eq!(s.vertices, 3);
        assert_eq!(s.surface_area, 2.0);
        let b = s.bounds.unwrap();
        assert_eq!(b.max, Vec3::new(2.0, 0.0, 2.0));
        assert!(s.to_string().starts_with("1 triangles"));
    }
}
