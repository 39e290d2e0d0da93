use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sobp_core::{SobpRequest, WeightMethod, run, solve_weights_with};

// Evenly spaced ranges from `r0` down to `r0 * (1 - chi)`
fn even_ranges(r0: f64, chi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| r0 * (1.0 - chi * i as f64 / (n - 1) as f64))
        .collect()
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("weights");
    for n in [19usize, 100, 400] {
        let ranges = even_ranges(26.0, 0.3, n);
        group.bench_function(format!("recursive_n{n}"), |b| {
            b.iter(|| solve_weights_with(WeightMethod::Recursive, 1.77, black_box(&ranges)))
        });
        group.bench_function(format!("analytical_n{n}"), |b| {
            b.iter(|| solve_weights_with(WeightMethod::Analytical, 1.77, black_box(&ranges)))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("run_200mev_chi025", |b| {
        b.iter_batched(
            || {
                SobpRequest::builder()
                    .with_energy(200.0)
                    .with_chi(0.25)
                    .build()
                    .unwrap()
            },
            |req| run(black_box(&req)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_solver, bench_pipeline);
criterion_main!(benches);
