//! Grid sweep over a scalar field, the triangle buffer it fills, and OBJ export.
#![forbid(unsafe_code)]

pub mod constants;
pub mod grid;
pub mod mesh_build;
pub mod obj;
pub mod shade;
pub mod stats;
pub mod sweep;

pub use constants::DEFAULT_VERTEX_CAPACITY;
pub use grid::GridSpec;
pub use mesh_build::MeshBuild;
pub use obj::{ObjOptions, ObjSummary, write_obj, write_obj_file};
pub use stats::MeshStats;
pub use sweep::{SweepTimings, build_mesh, build_mesh_par, build_mesh_par_timed, build_mesh_timed};
