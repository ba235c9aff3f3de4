use std::sync::Arc;
use std::time::{Duration, Instant};

use isocell_field::{ScalarField, SphereField, TerrainField};
use isocell_geom::Vec3;
use isocell_mesh::{DEFAULT_VERTEX_CAPACITY, GridSpec, build_mesh};
use isocell_runtime::{BuildJob, Runtime};

const WAIT: Duration = Duration::from_secs(30);

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sphere_job(rt: &Runtime, rev: u64, parallel: bool) -> BuildJob {
    BuildJob {
        job_id: rt.next_job_id(),
        rev,
        field: Arc::new(SphereField::new(Vec3::new(6.2, 6.1, 5.9), 4.3)),
        grid: GridSpec::new(Vec3::ZERO, [12, 12, 12], 1.0),
        iso_level: 0.0,
        capacity: DEFAULT_VERTEX_CAPACITY,
        parallel,
    }
}

fn wait_idle(rt: &Runtime) {
    let t0 = Instant::now();
    while !rt.is_idle() {
        assert!(t0.elapsed() < WAIT, "runtime never went idle: {:?}", rt.queue_counts());
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn builds_match_direct_sweep() {
    init_logs();
    let rt = Runtime::new(2).unwrap();
    let job = sphere_job(&rt, 1, false);
    let want = build_mesh(&*job.field, &job.grid, job.iso_level, job.capacity);
    let id = job.job_id;
    rt.submit(job);

    let out = rt.wait_result(WAIT).expect("result");
    assert_eq!(out.job_id, id);
    assert_eq!(out.field, "sphere");
    assert!(!out.skipped);
    assert!(out.stats.triangles > 0);
    assert_eq!(out.stats.triangles, out.mesh.triangle_count());
    assert_eq!(out.mesh, want);
    assert!(out.t_total_ms >= out.t_sample_ms.min(out.t_total_ms));
    wait_idle(&rt);
}

#[test]
fn parallel_job_matches_sequential_job() {
    init_logs();
    let rt = Runtime::new(2).unwrap();
    rt.submit(sphere_job(&rt, 1, false));
    rt.submit(sphere_job(&rt, 1, true));
    let a = rt.wait_result(WAIT).expect("first");
    let b = rt.wait_result(WAIT).expect("second");
    assert_eq!(a.mesh, b.mesh);
}

#[test]
fn older_revisions_are_stale() {
    init_logs();
    let rt = Runtime::new(1).unwrap();
    let field: Arc<dyn ScalarField> = Arc::new(TerrainField::default());
    for rev in 1..=3 {
        rt.submit(BuildJob {
            job_id: rt.next_job_id(),
            rev,
            field: field.clone(),
            grid: GridSpec::new(Vec3::new(0.0, -8.0, 0.0), [10, 6, 10], 3.0),
            iso_level: 0.0,
            capacity: DEFAULT_VERTEX_CAPACITY,
            parallel: false,
        });
    }
    assert_eq!(rt.latest_rev(), 3);

    let mut outs = Vec::new();
    while outs.len() < 3 {
        outs.push(rt.wait_result(WAIT).expect("result"));
    }
    let latest = rt.latest_rev();
    for out in &outs {
        assert_eq!(out.is_stale(latest), out.rev < 3);
        if out.skipped {
            assert!(out.mesh.is_empty());
            assert!(out.is_stale(latest));
        }
    }
    // the newest revision is always built
    let newest = outs.iter().find(|o| o.rev == 3).expect("rev 3");
    assert!(!newest.skipped);
    wait_idle(&rt);
    assert!(rt.drain_results().is_empty());
}

#[test]
fn drain_collects_everything_once() {
    init_logs();
    let rt = Runtime::new(3).unwrap();
    for _ in 0..4 {
        rt.submit(sphere_job(&rt, 0, false));
    }
    wait_idle(&rt);
    let outs = rt.drain_results();
    assert_eq!(outs.len(), 4);
    let mut ids: Vec<u64> = outs.iter().map(|o| o.job_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert!(rt.drain_results().is_empty());
}

#[test]
fn wait_times_out_when_nothing_queued() {
    init_logs();
    let rt = Runtime::new(1).unwrap();
    assert!(rt.wait_result(Duration::from_millis(20)).is_none());
    assert_eq!(rt.queue_counts(), (0, 0));
}

#[test]
fn idle_means_every_result_is_ready() {
    init_logs();
    let rt = Runtime::new(4).unwrap();
    for round in 0..20 {
        let n = 8;
        for _ in 0..n {
            rt.submit(BuildJob {
                job_id: rt.next_job_id(),
                rev: 0,
                field: Arc::new(SphereField::new(Vec3::new(1.1, 1.2, 0.9), 0.8)),
                grid: GridSpec::new(Vec3::ZERO, [2, 2, 2], 1.0),
                iso_level: 0.0,
                capacity: DEFAULT_VERTEX_CAPACITY,
                parallel: false,
            });
        }
        let t0 = Instant::now();
        let mut got = 0;
        loop {
            // a job leaving the queue is already counted in flight
            if rt.is_idle() {
                got += rt.drain_results().len();
                assert_eq!(got, n, "round {round}: idle with results missing");
                break;
            }
            got += rt.drain_results().len();
            assert!(t0.elapsed() < WAIT, "round {round} never went idle");
        }
    }
}
