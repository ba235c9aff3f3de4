//! Wavefront OBJ export.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;

use crate::mesh_build::MeshBuild;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjOptions {
    /// Merge vertices with bit-identical positions into one `v` line.
    pub weld: bool,
    /// Emit one `vn` per face and reference it from the face.
    pub normals: bool,
    /// Append `r g b` to each `v` line (common OBJ extension).
    pub colors: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjSummary {
    pub vertices: usize,
    pub normals: usize,
    pub faces: usize,
    /// Faces that collapsed to a line or point after welding and were left out.
    pub skipped_degenerate: usize,
}

#[inline]
fn weld_key(p: &[f32]) -> [u32; 3] {
    [
        (p[0] + 0.0).to_bits(),
        (p[1] + 0.0).to_bits(),
        (p[2] + 0.0).to_bits(),
    ]
}

fn write_vertex<W: Write>(w: &mut W, mesh: &MeshBuild, v: usize, colors: bool) -> io::Result<()> {
    let p = &mesh.pos[v * 3..v * 3 + 3];
    if colors {
        let c = &mesh.col[v * 4..v * 4 + 3];
        writeln!(
            w,
            "v {} {} {} {:.4} {:.4} {:.4}",
            p[0],
            p[1],
            p[2],
            f32::from(c[0]) / 255.0,
            f32::from(c[1]) / 255.0,
            f32::from(c[2]) / 255.0
        )
    } else {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])
    }
}

/// Writes `mesh` as OBJ text. Indices are 1-based, faces keep the mesh winding.
pub fn write_obj<W: Write>(mesh: &MeshBuild, w: &mut W, opts: &ObjOptions) -> io::Result<ObjSummary> {
    let mut summary = ObjSummary::default();
    writeln!(
        w,
        "# isocell mesh: {} triangles, {} vertices",
        mesh.triangle_count(),
        mesh.vertex_count()
    )?;

    // OBJ index of every mesh vertex
    let mut index = Vec::with_capacity(mesh.vertex_count());
    if opts.weld {
        let mut seen: HashMap<[u32; 3], usize> = HashMap::with_capacity(mesh.vertex_count() / 2);
        for v in 0..mesh.vertex_count() {
            let key = weld_key(&mesh.pos[v * 3..v * 3 + 3]);
            let next = seen.len() + 1;
            let id = *seen.entry(key).or_insert(next);
            if id == next {
                write_vertex(w, mesh, v, opts.colors)?;
            }
            index.push(id);
        }
        summary.vertices = seen.len();
    } else {
        for v in 0..mesh.vertex_count() {
            write_vertex(w, mesh, v, opts.colors)?;
            index.push(v + 1);
        }
        summary.vertices = mesh.vertex_count();
    }

    for t in 0..mesh.triangle_count() {
        let [a, b, c] = [index[t * 3], index[t * 3 + 1], index[t * 3 + 2]];
        if a == b || b == c || a == c {
            summary.skipped_degenerate += 1;
            continue;
        }
        if opts.normals {
            let n = &mesh.norm[t * 9..t * 9 + 3];
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
            summary.normals += 1;
            let vn = summary.normals;
            writeln!(w, "f {a}//{vn} {b}//{vn} {c}//{vn}")?;
        } else {
            writeln!(w, "f {a} {b} {c}")?;
        }
        summary.faces += 1;
    }
    Ok(summary)
}

pub fn write_obj_file(mesh: &MeshBuild, path: &Path, opts: &ObjOptions) -> io::Result<ObjSummary> {
    let mut w = BufWriter::new(File::create(path)?);
    let summary = write_obj(mesh, &mut w, opts)?;
    w.flush()?;
    log::info!(
        target: "mesh",
        "wrote {} ({} v, {} f, {} degenerate skipped)",
        path.display(),
        summary.vertices,
        summary.faces,
        summary.skipped_degenerate
    );
    Ok(summary)
}
