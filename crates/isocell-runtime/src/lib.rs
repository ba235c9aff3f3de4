//! Background mesh builds: a worker pool draining a job channel.
#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use isocell_field::ScalarField;
use isocell_mesh::{GridSpec, MeshBuild, MeshStats, build_mesh_par_timed, build_mesh_timed};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

#[derive(Clone)]
pub struct BuildJob {
    pub job_id: u64,
    /// Monotonic revision of the scene this job belongs to. Newer revisions supersede older ones.
    pub rev: u64,
    pub field: Arc<dyn ScalarField>,
    pub grid: GridSpec,
    pub iso_level: f32,
    /// Vertex budget passed to the mesh buffer.
    pub capacity: usize,
    /// Split the sweep into x-slabs on the runtime's sweep pool.
    pub parallel: bool,
}

impl fmt::Debug for BuildJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildJob")
            .field("job_id", &self.job_id)
            .field("rev", &self.rev)
            .field("field", &self.field.name())
            .field("grid", &self.grid)
            .field("iso_level", &self.iso_level)
            .field("capacity", &self.capacity)
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[derive(Debug)]
pub struct JobOut {
    pub job_id: u64,
    pub rev: u64,
    pub field: &'static str,
    pub mesh: MeshBuild,
    pub stats: MeshStats,
    /// The job was superseded before a worker picked it up; `mesh` is empty.
    pub skipped: bool,
    pub t_sample_ms: u32,
    pub t_mesh_ms: u32,
    pub t_total_ms: u32,
}

impl JobOut {
    /// True when a newer revision than this result's has been submitted.
    pub fn is_stale(&self, latest_rev: u64) -> bool {
        self.rev < latest_rev
    }
}

fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn process_build_job(job: BuildJob, sweep: &ThreadPool, latest_rev: &AtomicU64, tx: &Sender<JobOut>) {
    let t_job_start = Instant::now();
    let BuildJob {
        job_id,
        rev,
        field,
        grid,
        iso_level,
        capacity,
        parallel,
    } = job;

    if rev < latest_rev.load(Ordering::Acquire) {
        log::debug!(target: "runtime", "job {job_id} rev {rev} superseded; skipping");
        let mesh = MeshBuild::with_vertex_capacity(capacity);
        let _ = tx.send(JobOut {
            job_id,
            rev,
            field: field.name(),
            stats: MeshStats::of(&mesh),
            mesh,
            skipped: true,
            t_sample_ms: 0,
            t_mesh_ms: 0,
            t_total_ms: elapsed_ms(t_job_start),
        });
        return;
    }

    let (mesh, timings) = if parallel {
        sweep.install(|| build_mesh_par_timed(&*field, &grid, iso_level, capacity))
    } else {
        build_mesh_timed(&*field, &grid, iso_level, capacity)
    };
    let stats = MeshStats::of(&mesh);
    let t_total_ms = elapsed_ms(t_job_start);
    log::info!(
        target: "runtime",
        "job {job_id} rev {rev} {}: {} tris ({} dropped) in {}ms [sample={}ms mesh={}ms]",
        field.name(),
        stats.triangles,
        stats.dropped,
        t_total_ms,
        timings.sample_ms,
        timings.mesh_ms
    );
    let _ = tx.send(JobOut {
        job_id,
        rev,
        field: field.name(),
        mesh,
        stats,
        skipped: false,
        t_sample_ms: timings.sample_ms,
        t_mesh_ms: timings.mesh_ms,
        t_total_ms,
    });
}

pub struct Runtime {
    job_tx: Sender<BuildJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    _sweep_pool: Arc<ThreadPool>,
    q: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    latest_rev: Arc<AtomicU64>,
    next_job_id: AtomicU64,
    workers: usize,
}

impl Runtime {
    /// Spawns `workers` job workers (at least one) plus a sweep pool sized to the machine.
    pub fn new(workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let workers = workers.max(1);
        let sweep_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let (job_tx, job_rx) = unbounded::<BuildJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();

        let q = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));
        let latest_rev = Arc::new(AtomicU64::new(0));

        let sweep_pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(sweep_threads)
                .thread_name(|i| format!("isocell-sweep-{i}"))
                .build()?,
        );
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("isocell-job-{i}"))
                .build()?,
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let q = q.clone();
            let inflight = inflight.clone();
            let latest_rev = latest_rev.clone();
            let sweep = sweep_pool.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    // in flight before leaving the queue; `is_idle` relies on the overlap
                    inflight.fetch_add(1, Ordering::AcqRel);
                    q.fetch_sub(1, Ordering::AcqRel);
                    process_build_job(job, sweep.as_ref(), latest_rev.as_ref(), &tx);
                    inflight.fetch_sub(1, Ordering::AcqRel);
                }
            });
        }
        log::info!(
            target: "runtime",
            "runtime up: {workers} job workers, {sweep_threads} sweep threads"
        );

        Ok(Self {
            job_tx,
            res_rx,
            _pool: pool,
            _sweep_pool: sweep_pool,
            q,
            inflight,
            latest_rev,
            next_job_id: AtomicU64::new(1),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fresh id for a job about to be submitted.
    pub fn next_job_id(&self) -> u64 {
        self.next_job_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Highest revision submitted so far.
    pub fn latest_rev(&self) -> u64 {
        self.latest_rev.load(Ordering::Acquire)
    }

    pub fn submit(&self, job: BuildJob) {
        self.latest_rev.fetch_max(job.rev, Ordering::AcqRel);
        self.q.fetch_add(1, Ordering::AcqRel);
        let job_id = job.job_id;
        if self.job_tx.send(job).is_err() {
            self.q.fetch_sub(1, Ordering::AcqRel);
            log::warn!(target: "runtime", "job {job_id} dropped: workers gone");
        }
    }

    /// Results finished since the last call, in completion order. Never blocks.
    pub fn drain_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    /// Blocks up to `timeout` for the next finished job.
    pub fn wait_result(&self, timeout: Duration) -> Option<JobOut> {
        self.res_rx.recv_timeout(timeout).ok()
    }

    /// `(queued, in_flight)` job counts.
    pub fn queue_counts(&self) -> (usize, usize) {
        (
            self.q.load(Ordering::Acquire),
            self.inflight.load(Ordering::Acquire),
        )
    }

    /// True when nothing is queued or running. Reads the queue first: a job moves
    /// from queued to in flight with both counters briefly set, never neither.
    pub fn is_idle(&self) -> bool {
        let queued = self.q.load(Ordering::Acquire);
        let inflight = self.inflight.load(Ordering::Acquire);
        queued == 0 && inflight == 0
    }
}
