//! Criterion benchmarks for corrsim_engine.
//!
//! Benchmarks cover:
//! - Gaussian copula sampling (1K, 10K, 100K paths)
//! - Marginal transforms through PERT and gated columns
//! - Path accumulation with deterministic and stochastic growth

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use corrsim_core::correlation::CorrelationStructure;
use corrsim_engine::accumulate::{AccumulationConfig, Accumulator, ContributionSpec, GrowthSpec};
use corrsim_engine::copula::sample_uniform;
use corrsim_engine::rng::SimRng;
use corrsim_engine::transform::{transform, ColumnSpec};
use corrsim_models::marginals::{DriftScaling, Parametric, Pert, ZeroInflated};

fn structure() -> CorrelationStructure {
    CorrelationStructure::build(
        3,
        &[
            1.0, 0.6, 0.3, //
            0.6, 1.0, 0.2, //
            0.3, 0.2, 1.0,
        ],
    )
    .unwrap()
}

/// Benchmark copula sampling with varying path counts.
fn bench_copula_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("copula_sampling");
    let structure = structure();

    for n_paths in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("uniform_3d", n_paths),
            &n_paths,
            |b, &n| {
                let mut rng = SimRng::from_seed(42);
                b.iter(|| black_box(sample_uniform(&structure, n, &mut rng)));
            },
        );
    }

    group.finish();
}

/// Benchmark inverse-CDF transforms.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let structure = structure();
    let mut rng = SimRng::from_seed(42);
    let uniforms = sample_uniform(&structure, 10_000, &mut rng);

    let pert = vec![ColumnSpec::continuous(0, Pert::new(20.0, 20.0, 1500.0).unwrap().into())];
    group.bench_function("pert_10k", |b| {
        b.iter(|| black_box(transform(&uniforms, &pert).unwrap()))
    });

    let gated = vec![ColumnSpec::gated(
        1,
        2,
        ZeroInflated::new(0.3, Parametric::gamma(2.0, 50.0).unwrap().into()).unwrap(),
    )];
    group.bench_function("gated_gamma_10k", |b| {
        b.iter(|| black_box(transform(&uniforms, &gated).unwrap()))
    });

    group.finish();
}

/// Benchmark path accumulation over 20 years of monthly steps.
fn bench_accumulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulation");
    group.sample_size(20);

    let growths = [
        (
            "deterministic",
            GrowthSpec::Deterministic {
                annual_rate: 0.08,
                periods_per_year: 12,
            },
        ),
        (
            "stochastic",
            GrowthSpec::Stochastic {
                log_returns: Parametric::student_t(0.0004, 0.008, 4.0).unwrap().into(),
                days_per_period: 21.0,
                drift_scaling: DriftScaling::Linear,
            },
        ),
    ];

    for (name, growth) in growths {
        for n_paths in [1_000, 10_000] {
            let config = AccumulationConfig::builder()
                .time_steps(240)
                .path_count(n_paths)
                .seed(42)
                .growth(growth.clone())
                .contribution(ContributionSpec::Recurring { amount: 182.6 })
                .build()
                .unwrap();
            let mut accumulator = Accumulator::new(config);
            group.bench_with_input(BenchmarkId::new(name, n_paths), &n_paths, |b, _| {
                b.iter(|| black_box(accumulator.run().unwrap()))
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_copula_sampling,
    bench_transform,
    bench_accumulation
);
criterion_main!(benches);
