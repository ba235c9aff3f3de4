use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use isocell_geom::Vec3;
use isocell_mc::{GridCell, MAX_TRIANGLES, Triangle, to_polygon};

fn case_cells() -> Vec<GridCell> {
    (0..=255u8)
        .map(|case| {
            let samples: [f32; 8] = core::array::from_fn(|i| {
                if case & (1 << i) != 0 {
                    -0.25 - i as f32 * 0.1
                } else {
                    0.5 + i as f32 * 0.05
                }
            });
            GridCell::cube(Vec3::ZERO, 1.0, samples)
        })
        .collect()
}

fn bench_all_cases(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_polygon");
    let cells = case_cells();
    group.bench_function("all_256_cases", |b| {
        let mut out = [Triangle::default(); MAX_TRIANGLES];
        b.iter(|| {
            let mut total = 0usize;
            for cell in &cells {
                total += to_polygon(black_box(cell), 0.0, &mut out);
            }
            black_box(total);
        })
    });
    group.finish();
}

fn bench_sphere_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_polygon_sphere");
    let n = 32usize;
    let center = Vec3::splat(n as f32 * 0.5);
    let radius = n as f32 * 0.4;
    group.bench_function("sphere_32^3", |b| {
        let mut out = [Triangle::default(); MAX_TRIANGLES];
        b.iter(|| {
            let mut total = 0usize;
            for x in 0..n {
                for y in 0..n {
                    for z in 0..n {
                        let origin = Vec3::new(x as f32, y as f32, z as f32);
                        let cell = GridCell::from_fn(|[dx, dy, dz]| {
                            let p = origin + Vec3::new(dx as f32, dy as f32, dz as f32);
                            (p, radius - (p - center).length())
                        });
                        total += to_polygon(&cell, 0.0, &mut out);
                    }
                }
            }
            black_box(total);
        })
    });
    group.finish();
}

fn short_config() -> Criterion {
    Criterion::default()
        .measurement_time(Duration::from_secs(6))
        .warm_up_time(Duration::from_secs(2))
        .sample_size(30)
}

criterion_group! {
    name = benches;
    config = short_config();
    targets =
        bench_all_cases,
        bench_sphere_sweep
}
criterion_main!(benches);
