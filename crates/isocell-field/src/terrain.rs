use fastnoise_lite::{CellularDistanceFunction, CellularReturnType, FastNoiseLite, NoiseType};
use isocell_geom::Vec3;

use crate::ScalarField;
use crate::config::TerrainParams;

/// Rolling terrain: layered 3D noise, a linear height falloff and a 2D cellular term.
///
/// Points below `base_height` lean solid, points above it lean empty; the noise terms
/// carve overhangs and ridges into that slope.
pub struct TerrainField {
    params: TerrainParams,
    noise: FastNoiseLite,
    cells: FastNoiseLite,
}

impl TerrainField {
    pub fn new(params: TerrainParams) -> Self {
        let mut noise = FastNoiseLite::with_seed(params.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        // frequency is applied per octave in `fractal3`
        noise.set_frequency(Some(1.0));
        let mut cells = FastNoiseLite::with_seed(params.seed ^ 0x2C1B_3C6D);
        cells.set_noise_type(Some(NoiseType::Cellular));
        cells.set_cellular_distance_function(Some(CellularDistanceFunction::Euclidean));
        cells.set_cellular_return_type(Some(CellularReturnType::Distance));
        cells.set_frequency(Some(params.cellular_frequency));
        Self {
            params,
            noise,
            cells,
        }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Plain octave sum, not normalised: with unit persistence `n` octaves span `[-n, n]`.
    fn fractal3(&self, p: Vec3) -> f32 {
        let f = &self.params;
        let mut amp = 1.0_f32;
        let mut freq = f.frequency;
        let mut sum = 0.0_f32;
        for _ in 0..f.octaves.max(1) {
            sum += self.noise.get_noise_3d(p.x * freq, p.y * freq, p.z * freq) * amp;
            amp *= f.persistence;
            freq *= f.lacunarity;
        }
        sum
    }

    /// Distance from `(x, z)` to the nearest cellular feature point, never negative.
    pub fn cell_distance(&self, x: f32, z: f32) -> f32 {
        // fastnoise reports `distance - 1`
        (self.cells.get_noise_2d(x, z) + 1.0).max(0.0)
    }
}

impl Default for TerrainField {
    fn default() -> Self {
        Self::new(TerrainParams::default())
    }
}

impl ScalarField for TerrainField {
    fn sample(&self, p: Vec3) -> f32 {
        let f = &self.params;
        let layered = self.fractal3(p) * f.amplitude;
        let slope = (f.base_height - p.y) * f.falloff;
        let ridges = self.cell_distance(p.x, p.z) * f.cellular_weight;
        layered + slope + ridges
    }

    fn name(&self) -> &'static str {
        "terrain"
    }
}
