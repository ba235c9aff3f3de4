use isocell_geom::Vec3;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::{ScalarField, SphereField, TerrainField, TilesField};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FieldConfig {
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default)]
    pub terrain: TerrainParams,
    #[serde(default)]
    pub sphere: SphereParams,
    #[serde(default)]
    pub tiles: TilesParams,
    #[serde(default)]
    pub grid: GridConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            kind: FieldKind::Terrain,
            terrain: TerrainParams::default(),
            sphere: SphereParams::default(),
            tiles: TilesParams::default(),
            grid: GridConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Terrain,
    Sphere,
    Tiles,
}

fn default_kind() -> FieldKind {
    FieldKind::Terrain
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Terrain => "terrain",
            FieldKind::Sphere => "sphere",
            FieldKind::Tiles => "tiles",
        }
    }

    /// Lattice spacing used when `[grid] cell_size` is not given.
    pub fn default_cell_size(self) -> f32 {
        match self {
            FieldKind::Terrain => 7.0,
            FieldKind::Sphere => 2.0,
            FieldKind::Tiles => 1.0,
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terrain" => Ok(FieldKind::Terrain),
            "sphere" => Ok(FieldKind::Sphere),
            "tiles" => Ok(FieldKind::Tiles),
            other => Err(format!("unknown field kind '{other}' (terrain|sphere|tiles)")),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainParams {
    #[serde(default = "default_terrain_seed")]
    pub seed: i32,
    #[serde(default = "default_terrain_frequency")]
    pub frequency: f32,
    #[serde(default = "default_terrain_octaves")]
    pub octaves: i32,
    #[serde(default = "default_terrain_persistence")]
    pub persistence: f32,
    /// Frequency multiplier from one octave to the next. Below 1 each octave is
    /// broader than the last, so the default 0.5 layers swells under the base pattern.
    #[serde(default = "default_terrain_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_terrain_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_terrain_base_height")]
    pub base_height: f32,
    #[serde(default = "default_terrain_falloff")]
    pub falloff: f32,
    #[serde(default = "default_cellular_frequency")]
    pub cellular_frequency: f32,
    #[serde(default = "default_cellular_weight")]
    pub cellular_weight: f32,
}
fn default_terrain_seed() -> i32 {
    1337
}
fn default_terrain_frequency() -> f32 {
    0.025
}
fn default_terrain_octaves() -> i32 {
    4
}
fn default_terrain_persistence() -> f32 {
    1.0
}
fn default_terrain_lacunarity() -> f32 {
    0.5
}
fn default_terrain_amplitude() -> f32 {
    0.5
}
fn default_terrain_base_height() -> f32 {
    8.0
}
fn default_terrain_falloff() -> f32 {
    0.01
}
fn default_cellular_frequency() -> f32 {
    0.02
}
fn default_cellular_weight() -> f32 {
    0.25
}
impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: default_terrain_seed(),
            frequency: default_terrain_frequency(),
            octaves: default_terrain_octaves(),
            persistence: default_terrain_persistence(),
            lacunarity: default_terrain_lacunarity(),
            amplitude: default_terrain_amplitude(),
            base_height: default_terrain_base_height(),
            falloff: default_terrain_falloff(),
            cellular_frequency: default_cellular_frequency(),
            cellular_weight: default_cellular_weight(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SphereParams {
    #[serde(default = "default_sphere_center")]
    pub center: [f32; 3],
    #[serde(default = "default_sphere_radius")]
    pub radius: f32,
}
fn default_sphere_center() -> [f32; 3] {
    [25.0, 25.0, 25.0]
}
fn default_sphere_radius() -> f32 {
    25.0
}
impl Default for SphereParams {
    fn default() -> Self {
        Self {
            center: default_sphere_center(),
            radius: default_sphere_radius(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TilesParams {
    #[serde(default = "default_tiles_seed")]
    pub seed: i32,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_floor_y")]
    pub floor_y: f32,
    /// Height above `floor_y` over which a tile's draw maps to its plateau level.
    #[serde(default = "default_tile_height")]
    pub tile_height: f32,
    /// Added to every draw; tiles with `draw + lift > 1` rise through the whole column.
    #[serde(default = "default_tile_lift")]
    pub lift: f32,
}
fn default_tiles_seed() -> i32 {
    1337
}
fn default_tile_size() -> f32 {
    20.0
}
fn default_floor_y() -> f32 {
    5.0
}
fn default_tile_height() -> f32 {
    20.0
}
fn default_tile_lift() -> f32 {
    0.1
}
impl Default for TilesParams {
    fn default() -> Self {
        Self {
            seed: default_tiles_seed(),
            tile_size: default_tile_size(),
            floor_y: default_floor_y(),
            tile_height: default_tile_height(),
            lift: default_tile_lift(),
        }
    }
}

/// Sampling lattice. `cell_size` and `iso` fall back to the field kind's defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_grid_origin")]
    pub origin: [f32; 3],
    #[serde(default = "default_grid_dims")]
    pub dims: [usize; 3],
    #[serde(default)]
    pub cell_size: Option<f32>,
    #[serde(default)]
    pub iso: Option<f32>,
}
fn default_grid_origin() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}
fn default_grid_dims() -> [usize; 3] {
    [128, 32, 128]
}
impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: default_grid_origin(),
            dims: default_grid_dims(),
            cell_size: None,
            iso: None,
        }
    }
}

impl FieldConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: FieldConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would make a field or the lattice degenerate.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let g = &self.grid;
        if g.dims.contains(&0) {
            return Err(format!("grid.dims must be non-zero, got {:?}", g.dims).into());
        }
        let cs = self.cell_size();
        if !(cs.is_finite() && cs > 0.0) {
            return Err(format!("grid.cell_size must be positive, got {cs}").into());
        }
        if !g.origin.iter().all(|v| v.is_finite()) {
            return Err(format!("grid.origin must be finite, got {:?}", g.origin).into());
        }
        if !self.iso_level().is_finite() {
            return Err("grid.iso must be finite".into());
        }
        match self.kind {
            FieldKind::Sphere => {
                let r = self.sphere.radius;
                if !(r.is_finite() && r > 0.0) {
                    return Err(format!("sphere.radius must be positive, got {r}").into());
                }
            }
            FieldKind::Tiles => {
                let t = self.tiles.tile_size;
                if !(t.is_finite() && t > 0.0) {
                    return Err(format!("tiles.tile_size must be positive, got {t}").into());
                }
                let h = self.tiles.tile_height;
                if !(h.is_finite() && h > 0.0) {
                    return Err(format!("tiles.tile_height must be positive, got {h}").into());
                }
            }
            FieldKind::Terrain => {
                if self.terrain.octaves < 1 {
                    return Err(format!(
                        "terrain.octaves must be at least 1, got {}",
                        self.terrain.octaves
                    )
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn cell_size(&self) -> f32 {
        self.grid
            .cell_size
            .unwrap_or_else(|| self.kind.default_cell_size())
    }

    /// Explicit `[grid] iso`, else the field's own threshold.
    pub fn iso_level(&self) -> f32 {
        self.grid.iso.unwrap_or(match self.kind {
            FieldKind::Tiles => 0.5,
            FieldKind::Terrain | FieldKind::Sphere => 0.0,
        })
    }

    pub fn build(&self) -> Box<dyn ScalarField> {
        log::info!(
            target: "field",
            "building {} field (cell_size={}, iso={})",
            self.kind.as_str(),
            self.cell_size(),
            self.iso_level()
        );
        match self.kind {
            FieldKind::Terrain => Box::new(TerrainField::new(self.terrain.clone())),
            FieldKind::Sphere => Box::new(SphereField::new(
                Vec3::from(self.sphere.center),
                self.sphere.radius,
            )),
            FieldKind::Tiles => Box::new(TilesField::new(self.tiles.clone())),
        }
    }
}

pub fn load_field_config(path: &Path) -> Result<FieldConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)
        .map_err(|e| format!("failed to read field config {}: {e}", path.display()))?;
    FieldConfig::from_toml_str(&s)
        .map_err(|e| format!("invalid field config {}: {e}", path.display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default_terrain() {
        let cfg = FieldConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, FieldConfig::default());
        assert_eq!(cfg.cell_size(), 7.0);
        assert_eq!(cfg.iso_level(), 0.0);
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("Sphere".parse::<FieldKind>(), Ok(FieldKind::Sphere));
        assert!("lava".parse::<FieldKind>().is_err());
    }

    #[test]
    fn tiles_default_iso_is_half() {
        let cfg = FieldConfig::from_toml_str("kind = \"tiles\"").unwrap();
        assert_eq!(cfg.iso_level(), 0.5);
        assert_eq!(cfg.cell_size(), 1.0);
        assert_eq!(cfg.build().iso_level(), 0.5);
    }
}
