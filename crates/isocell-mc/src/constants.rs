//! Shared constants for isocell-mc. Centralizes the cube and table dimensions.

pub const CORNER_COUNT: usize = 8;
pub const EDGE_COUNT: usize = 12;
pub const CASE_COUNT: usize = 256; // 2^8 inside/outside corner patterns

// Row width of the triangle table: 5 triples plus the -1 terminator.
pub const TRI_ROW_LEN: usize = 16;
pub const TRI_SENTINEL: i8 = -1;

/// Most triangles any single cell can produce with the classic 256-case table.
pub const MAX_TRIANGLES: usize = 5;

/// Sample differences below this are treated as flat; the crossing snaps to the edge midpoint.
pub const FLAT_EDGE_EPSILON: f32 = 1e-10;
