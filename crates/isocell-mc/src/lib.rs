//! Marching Cubes polygonizer: one grid cell and an iso level in, up to five triangles out.
#![forbid(unsafe_code)]

pub mod cell;
pub mod constants;
pub mod polygonize;
#[rustfmt::skip]
pub mod tables;

pub use cell::{GridCell, Triangle};
pub use constants::MAX_TRIANGLES;
pub use polygonize::{case_index, case_triangle_count, interpolate_edge, polygonize, to_polygon};
