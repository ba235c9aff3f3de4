use isocell_geom::Vec3;

use crate::constants::{BRIGHTNESS_JITTER, GRASS_RGB, OPAQUE_ALPHA, ROCK_RGB, UP_JITTER};

#[inline]
fn uhash32(mut a: u32) -> u32 {
    a ^= a >> 16;
    a = a.wrapping_mul(0x7feb_352d);
    a ^= a >> 15;
    a = a.wrapping_mul(0x846c_a68b);
    a ^= a >> 16;
    a
}

#[inline]
fn hash_point(p: Vec3, salt: u32) -> u32 {
    // `+ 0.0` folds -0.0 into 0.0 so both hash alike
    let h = uhash32((p.x + 0.0).to_bits() ^ salt);
    let h = uhash32(h ^ (p.y + 0.0).to_bits());
    uhash32(h ^ (p.z + 0.0).to_bits())
}

/// Uniform value in `[0, 1)` derived from `h`.
#[inline]
fn unit_f32(h: u32) -> f32 {
    (h >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Rock-to-grass tint for a face with unit normal `n`, before per-vertex jitter.
///
/// The blend weight is `max(dot(n, up'), 0)` where `up'` is the y axis nudged
/// sideways by a hash of `anchor`, so neighbouring faces do not band.
pub fn face_tint(n: Vec3, anchor: Vec3) -> [f32; 3] {
    let h = hash_point(anchor, 0x9E37_79B9);
    let jx = (unit_f32(h) * 2.0 - 1.0) * UP_JITTER;
    let jz = (unit_f32(uhash32(h)) * 2.0 - 1.0) * UP_JITTER;
    let up = Vec3::new(jx, 1.0, jz);
    lerp3(ROCK_RGB, GRASS_RGB, n.dot(up).max(0.0))
}

/// Final vertex colour: `tint` plus a grey offset hashed from the vertex position.
pub fn vertex_rgba(tint: [f32; 3], p: Vec3) -> [u8; 4] {
    let g = unit_f32(hash_point(p, 0x85EB_CA6B)) * BRIGHTNESS_JITTER;
    let to_u8 = |c: f32| ((c + g).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_u8(tint[0]), to_u8(tint[1]), to_u8(tint[2]), OPAQUE_ALPHA]
}
