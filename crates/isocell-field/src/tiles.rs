use fastnoise_lite::{FastNoiseLite, NoiseType};
use isocell_geom::Vec3;

use crate::ScalarField;
use crate::config::TilesParams;

/// Blocky plateaus: space is cut into `tile_size` cubes and each tile draws a noise
/// value that sets how far above `floor_y` it is filled.
///
/// Everything at or below `floor_y` is solid. Samples are exactly 0.0 or 1.0, so the
/// surface sits halfway between lattice points.
pub struct TilesField {
    params: TilesParams,
    noise: FastNoiseLite,
}

impl TilesField {
    pub fn new(params: TilesParams) -> Self {
        let mut noise = FastNoiseLite::with_seed(params.seed);
        noise.set_noise_type(Some(NoiseType::Value));
        // sampled at integer tile coordinates, so each tile reads one lattice value
        noise.set_frequency(Some(1.0));
        Self { params, noise }
    }

    pub fn params(&self) -> &TilesParams {
        &self.params
    }

    /// Noise draw in `[0, 1]` for the tile containing `p`.
    pub fn tile_value(&self, p: Vec3) -> f32 {
        let s = self.params.tile_size;
        let (tx, ty, tz) = ((p.x / s).floor(), (p.y / s).floor(), (p.z / s).floor());
        ((self.noise.get_noise_3d(tx, ty, tz) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl Default for TilesField {
    fn default() -> Self {
        Self::new(TilesParams::default())
    }
}

impl ScalarField for TilesField {
    fn sample(&self, p: Vec3) -> f32 {
        let t = &self.params;
        let threshold = ((p.y - t.floor_y) / t.tile_height).clamp(0.0, 1.0);
        if self.tile_value(p) + t.lift > threshold {
            1.0
        } else {
            0.0
        }
    }

    fn iso_level(&self) -> f32 {
        0.5
    }

    fn name(&self) -> &'static str {
        "tiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_binary() {
        let t = TilesField::default();
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 1.3, (i % 12) as f32, i as f32 * 0.9);
            let v = t.sample(p);
            assert!(v == 0.0 || v == 1.0);
        }
    }

    #[test]
    fn unlifted_tiles_stop_below_full_height() {
        let params = TilesParams {
            lift: 0.0,
            ..TilesParams::default()
        };
        let t = TilesField::new(params.clone());
        let y = params.floor_y + params.tile_height;
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 2.1, y + (i % 5) as f32, i as f32 * 3.3);
            assert_eq!(t.sample(p), 0.0);
        }
    }

    #[test]
    fn plateau_heights_follow_the_tile_draw() {
        let t = TilesField::default();
        let s = t.params().tile_size;
        let mut tops = Vec::new();
        for tx in 0..7 {
            for tz in 0..7 {
                let (x, z) = (tx as f32 * s + 3.0, tz as f32 * s + 3.0);
                let top = (0..=32)
                    .filter(|&y| t.sample(Vec3::new(x, y as f32, z)) == 1.0)
                    .max();
                tops.push(top);
            }
        }
        tops.sort_unstable();
        tops.dedup();
        assert!(tops.len() >= 3, "{tops:?}");
    }

    #[test]
    fn tile_is_uniform_below_floor() {
        let t = TilesField::default();
        let s = t.params().tile_size;
        let base = Vec3::new(3.0 * s, 0.0, -2.0 * s);
        let want = t.sample(base);
        for dx in [0.0, 0.25, 0.5, 0.99] {
            for dz in [0.0, 0.4, 0.99] {
                let p = base + Vec3::new(dx * s, 0.0, dz * s);
                assert_eq!(t.sample(p), want);
            }
        }
    }

    #[test]
    fn iso_level_is_half() {
        assert_eq!(TilesField::default().iso_level(), 0.5);
    }
}
