use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use isocell_field::{FieldConfig, ScalarField, load_field_config};
use isocell_geom::Vec3;
use isocell_mc::{GridCell, case_index, polygonize};
use isocell_mesh::{GridSpec, ObjOptions, write_obj_file};
use isocell_runtime::{BuildJob, JobOut, Runtime};

use crate::cli::{BuildArgs, CellArgs, WatchArgs};

const RESULT_POLL: Duration = Duration::from_millis(250);

fn job_from_config(rt: &Runtime, cfg: &FieldConfig, rev: u64, capacity: usize, parallel: bool) -> BuildJob {
    let field: Arc<dyn ScalarField> = Arc::from(cfg.build());
    BuildJob {
        job_id: rt.next_job_id(),
        rev,
        field,
        grid: GridSpec::from_config(cfg),
        iso_level: cfg.iso_level(),
        capacity,
        parallel,
    }
}

fn write_result(out: &JobOut, path: &Path, opts: &ObjOptions) -> Result<(), Box<dyn Error>> {
    let summary = write_obj_file(&out.mesh, path, opts)
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    if summary.skipped_degenerate > 0 {
        log::info!(
            target: "mesh",
            "{} faces collapsed by welding were left out",
            summary.skipped_degenerate
        );
    }
    Ok(())
}

pub fn run_build(args: &BuildArgs) -> Result<(), Box<dyn Error>> {
    let cfg = args.field_config()?;
    let rt = Runtime::new(1)?;
    rt.submit(job_from_config(&rt, &cfg, 1, args.max_vertices, !args.sequential));

    let out = loop {
        if let Some(out) = rt.wait_result(RESULT_POLL) {
            break out;
        }
        let (queued, inflight) = rt.queue_counts();
        log::trace!(target: "runtime", "waiting: {queued} queued, {inflight} in flight");
    };
    log::info!(
        target: "mesh",
        "{} in {}ms (sample {}ms, mesh {}ms)",
        out.field,
        out.t_total_ms,
        out.t_sample_ms,
        out.t_mesh_ms
    );
    println!("{}", out.stats);
    if let Some(path) = &args.out {
        write_result(&out, path, &args.obj.options())?;
    }
    Ok(())
}

/// Drains pending change notifications; true if there was at least one.
fn drain_changes(rx: &mpsc::Receiver<()>) -> bool {
    let mut changed = false;
    while rx.try_recv().is_ok() {
        changed = true;
    }
    changed
}

pub fn run_watch(args: &WatchArgs) -> Result<(), Box<dyn Error>> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let cfg = load_field_config(&args.config)?;
    let rt = Runtime::new(1)?;
    let opts = args.obj.options();
    let parallel = !args.sequential;

    // Editors often replace the file instead of writing in place, so watch the
    // directory and filter on the file name.
    let dir = match args.config.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let file_name = args.config.file_name().map(|n| n.to_os_string());
    let (fs_tx, fs_rx) = mpsc::channel::<()>();
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res {
            match event.kind {
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if ours {
                        let _ = fs_tx.send(());
                    }
                }
                _ => {}
            }
        }
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    log::info!(
        target: "runtime",
        "watching {} -> {}",
        args.config.display(),
        args.out.display()
    );

    let mut rev = 1;
    rt.submit(job_from_config(&rt, &cfg, rev, args.max_vertices, parallel));
    loop {
        if let Some(out) = rt.wait_result(RESULT_POLL) {
            if out.skipped || out.is_stale(rt.latest_rev()) {
                log::debug!(target: "runtime", "discarding rev {} (latest {})", out.rev, rt.latest_rev());
            } else {
                match write_result(&out, &args.out, &opts) {
                    Ok(()) => log::info!(target: "mesh", "rev {}: {}", out.rev, out.stats),
                    Err(e) => log::error!(target: "mesh", "{e}"),
                }
            }
        }

        if !drain_changes(&fs_rx) {
            continue;
        }
        // let a burst of writes settle before reading the file
        std::thread::sleep(Duration::from_millis(args.debounce_ms));
        drain_changes(&fs_rx);
        match load_field_config(&args.config) {
            Ok(cfg) => {
                rev += 1;
                log::info!(target: "field", "config changed; rebuilding as rev {rev}");
                rt.submit(job_from_config(&rt, &cfg, rev, args.max_vertices, parallel));
            }
            Err(e) => log::error!(target: "field", "{e}; keeping the last mesh"),
        }
    }
}

pub fn run_cell(args: &CellArgs) -> Result<(), Box<dyn Error>> {
    let samples = args.corner_samples()?;
    let cell = GridCell::cube(Vec3::ZERO, args.size, samples);
    let case = case_index(&cell, args.iso);
    let tris = polygonize(&cell, args.iso);
    println!("case {case} ({case:08b}): {} triangle(s)", tris.len());
    for (i, t) in tris.iter().enumerate() {
        let [a, b, c] = t.p;
        println!(
            "  {i}: ({}, {}, {}) ({}, {}, {}) ({}, {}, {})",
            a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isocell_field::FieldKind;
    use isocell_mesh::{DEFAULT_VERTEX_CAPACITY, build_mesh};

    #[test]
    fn job_carries_the_config_grid_and_iso() {
        let rt = Runtime::new(1).unwrap();
        let mut cfg = FieldConfig::default();
        cfg.kind = FieldKind::Tiles;
        cfg.grid.dims = [6, 4, 6];
        let job = job_from_config(&rt, &cfg, 7, 99, true);
        assert_eq!(job.rev, 7);
        assert_eq!(job.iso_level, 0.5);
        assert_eq!(job.grid.dims, [6, 4, 6]);
        assert_eq!(job.grid.cell_size, 1.0);
        assert_eq!(job.capacity, 99);
        assert!(job.parallel);
        assert_eq!(job.field.name(), "tiles");
    }

    #[test]
    fn built_job_matches_direct_sweep() {
        let rt = Runtime::new(1).unwrap();
        let mut cfg = FieldConfig::default();
        cfg.kind = FieldKind::Sphere;
        cfg.sphere.center = [6.3, 5.9, 6.1];
        cfg.sphere.radius = 4.1;
        cfg.grid.dims = [12, 12, 12];
        cfg.grid.cell_size = Some(1.0);
        let job = job_from_config(&rt, &cfg, 1, DEFAULT_VERTEX_CAPACITY, false);
        let want = build_mesh(&*job.field, &job.grid, job.iso_level, job.capacity);
        rt.submit(job);
        let out = rt.wait_result(Duration::from_secs(30)).unwrap();
        assert_eq!(out.mesh, want);

        let path = std::env::temp_dir().join(format!("isocell-cmd-{}.obj", std::process::id()));
        write_result(&out, &path, &ObjOptions::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let faces = text.lines().filter(|l| l.starts_with("f ")).count();
        assert_eq!(faces, out.stats.triangles);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn change_bursts_collapse() {
        let (tx, rx) = mpsc::channel();
        assert!(!drain_changes(&rx));
        for _ in 0..5 {
            tx.send(()).unwrap();
        }
        assert!(drain_changes(&rx));
        assert!(!drain_changes(&rx));
    }
}
