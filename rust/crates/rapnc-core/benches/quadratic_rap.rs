use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rapnc_core::{solve_quadratic_rap, QuadraticRap, RapMethod, RapOptions};

fn build_problem(n: usize, seed: u64) -> QuadraticRap {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = (0..n).map(|_| rng.gen_range(0.1..10.0)).collect();
    let b = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
    let upper: Vec<f64> = (0..n).map(|_| rng.gen_range(1.0..10.0)).collect();
    let budget = upper.iter().sum::<f64>() / 2.0;
    QuadraticRap::new(a, b, budget, vec![0.0; n], upper).unwrap()
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic_rap");
    let opts = RapOptions::default();
    for &size in &[1_000usize, 10_000, 100_000] {
        let problem = build_problem(size, 11);
        for method in [RapMethod::Bisection, RapMethod::Brucker] {
            group.bench_with_input(
                BenchmarkId::new(format!("{method:?}"), size),
                &problem,
                |b, problem| b.iter(|| solve_quadratic_rap(problem, method, &opts).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_methods);
criterion_main!(benches);
