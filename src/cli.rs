use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use isocell_field::{FieldConfig, FieldKind, load_field_config};
use isocell_mesh::{DEFAULT_VERTEX_CAPACITY, ObjOptions};

use crate::logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "isocell")]
#[command(about = "Polygonize scalar fields into triangle meshes", long_about = None)]
pub struct Cli {
    /// Log verbosity for the terminal and the log file
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Also write log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a field over a grid and write the mesh as OBJ
    Build(BuildArgs),
    /// Rebuild the mesh every time a field config file changes
    Watch(WatchArgs),
    /// Polygonize a single cube from eight corner samples
    Cell(CellArgs),
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjArgs {
    /// Merge vertices with identical positions
    #[arg(long)]
    pub weld: bool,

    /// Write per-face normals
    #[arg(long)]
    pub normals: bool,

    /// Append vertex colours to `v` lines
    #[arg(long)]
    pub colors: bool,
}

impl ObjArgs {
    pub fn options(&self) -> ObjOptions {
        ObjOptions {
            weld: self.weld,
            normals: self.normals,
            colors: self.colors,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Field to sample (terrain, sphere, tiles); overrides the config's `kind`
    #[arg(long)]
    pub field: Option<FieldKind>,

    /// TOML field config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output OBJ path; stats only when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub obj: ObjArgs,

    /// Sweep on one thread instead of in x-slabs
    #[arg(long)]
    pub sequential: bool,

    /// Cell counts along x, y and z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    pub dims: Option<Vec<usize>>,

    /// Edge length of one grid cell
    #[arg(long)]
    pub cell_size: Option<f32>,

    /// Iso level; defaults to the field's own
    #[arg(long, allow_negative_numbers = true)]
    pub iso: Option<f32>,

    /// Vertex budget; triangles past it are dropped
    #[arg(long, default_value_t = DEFAULT_VERTEX_CAPACITY)]
    pub max_vertices: usize,
}

impl BuildArgs {
    /// Config file (or defaults) with command-line overrides applied, validated.
    pub fn field_config(&self) -> Result<FieldConfig, Box<dyn Error>> {
        let mut cfg = match &self.config {
            Some(path) => load_field_config(path)?,
            None => FieldConfig::default(),
        };
        if let Some(kind) = self.field {
            cfg.kind = kind;
        }
        if let Some(dims) = &self.dims {
            cfg.grid.dims = <[usize; 3]>::try_from(dims.as_slice())
                .map_err(|_| format!("--dims takes 3 values, got {}", dims.len()))?;
        }
        if let Some(cs) = self.cell_size {
            cfg.grid.cell_size = Some(cs);
        }
        if let Some(iso) = self.iso {
            cfg.grid.iso = Some(iso);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// TOML field config to watch
    #[arg(long)]
    pub config: PathBuf,

    /// OBJ path rewritten after each rebuild
    #[arg(short, long)]
    pub out: PathBuf,

    #[command(flatten)]
    pub obj: ObjArgs,

    /// Sweep on one thread instead of in x-slabs
    #[arg(long)]
    pub sequential: bool,

    /// Quiet period after a change before reloading
    #[arg(long, default_value_t = 150)]
    pub debounce_ms: u64,

    #[arg(long, default_value_t = DEFAULT_VERTEX_CAPACITY)]
    pub max_vertices: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CellArgs {
    /// Corner samples s0..s7
    #[arg(long, num_args = 8, required = true, allow_negative_numbers = true)]
    pub samples: Vec<f32>,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub iso: f32,

    /// Cube edge length
    #[arg(long, default_value_t = 1.0)]
    pub size: f32,
}

impl CellArgs {
    pub fn corner_samples(&self) -> Result<[f32; 8], Box<dyn Error>> {
        <[f32; 8]>::try_from(self.samples.as_slice())
            .map_err(|_| format!("--samples takes 8 values, got {}", self.samples.len()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_overrides_reach_the_config() {
        let cli = parse(&[
            "isocell", "build", "--field", "sphere", "--dims", "4", "5", "6", "--cell-size",
            "0.5", "--iso", "-0.25", "--weld",
        ]);
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(args.obj.weld);
        assert!(!args.obj.normals);
        let cfg = args.field_config().unwrap();
        assert_eq!(cfg.kind, FieldKind::Sphere);
        assert_eq!(cfg.grid.dims, [4, 5, 6]);
        assert_eq!(cfg.cell_size(), 0.5);
        assert_eq!(cfg.iso_level(), -0.25);
    }

    #[test]
    fn build_defaults_follow_the_field_kind() {
        let cli = parse(&["isocell", "build", "--field", "tiles"]);
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.max_vertices, DEFAULT_VERTEX_CAPACITY);
        let cfg = args.field_config().unwrap();
        assert_eq!(cfg.cell_size(), 1.0);
        assert_eq!(cfg.iso_level(), 0.5);
    }

    #[test]
    fn build_rejects_zero_dims() {
        let cli = parse(&["isocell", "build", "--dims", "0", "2", "2"]);
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(args.field_config().is_err());
    }

    #[test]
    fn unknown_field_is_a_usage_error() {
        assert!(Cli::try_parse_from(["isocell", "build", "--field", "lava"]).is_err());
    }

    #[test]
    fn cell_takes_eight_signed_samples() {
        let cli = parse(&[
            "isocell", "--log-level", "warn", "cell", "--samples", "-1", "1", "1", "1", "1", "1",
            "1", "1",
        ]);
        assert_eq!(cli.log_level, LogLevel::Warn);
        let Commands::Cell(args) = cli.command else {
            panic!("expected cell");
        };
        let s = args.corner_samples().unwrap();
        assert_eq!(s[0], -1.0);
        assert_eq!(args.iso, 0.0);
        assert!(Cli::try_parse_from(["isocell", "cell", "--samples", "1", "2"]).is_err());
    }

    #[test]
    fn watch_requires_config_and_out() {
        assert!(Cli::try_parse_from(["isocell", "watch", "--config", "a.toml"]).is_err());
        let cli = parse(&["isocell", "watch", "--config", "a.toml", "-o", "a.obj"]);
        let Commands::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.debounce_ms, 150);
        assert_eq!(args.out, PathBuf::from("a.obj"));
    }
}
