use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use rapnc_core::{
    solve_quadratic_rap, CostKind, QuadraticRap, RapError, RapMethod, RapOptions, RapSolution,
};

const METHODS: [RapMethod; 2] = [RapMethod::Bisection, RapMethod::Brucker];

fn random_problem(rng: &mut StdRng, n: usize) -> QuadraticRap {
    let a: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..10.0)).collect();
    let b: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
    let lower: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..5.0)).collect();
    let upper: Vec<f64> = lower.iter().map(|lb| lb + rng.gen_range(0.0..10.0)).collect();
    let lo: f64 = lower.iter().sum();
    let hi: f64 = upper.iter().sum();
    let budget = lo + rng.gen_range(0.0..1.0) * (hi - lo);
    QuadraticRap::new(a, b, budget, lower, upper).unwrap()
}

/// Checks feasibility and the stationarity conditions at the reported dual.
fn assert_optimal(problem: &QuadraticRap, solution: &RapSolution) {
    let tol = 1e-6 * problem.budget.abs().max(1.0);
    let total: f64 = solution.x.iter().sum();
    assert!((total - problem.budget).abs() <= tol, "sum {total} vs {}", problem.budget);
    for i in 0..problem.dimension() {
        let xi = solution.x[i];
        assert!(xi >= problem.lower[i] - 1e-9 && xi <= problem.upper[i] + 1e-9);
        let gradient = problem.a[i] * xi + problem.b[i];
        if xi > problem.lower[i] + 1e-7 {
            assert!(gradient <= -solution.dual + 1e-6, "item {i} should move down");
        }
        if xi < problem.upper[i] - 1e-7 {
            assert!(gradient >= -solution.dual - 1e-6, "item {i} should move up");
        }
    }
}

#[test]
fn symmetric_budget_splits_evenly() {
    let problem =
        QuadraticRap::new(vec![1.0; 5], vec![0.0; 5], 25.0, vec![0.0; 5], vec![10.0; 5]).unwrap();
    for method in METHODS {
        let solution = solve_quadratic_rap(&problem, method, &RapOptions::default()).unwrap();
        for &xi in &solution.x {
            assert!((xi - 5.0).abs() < 1e-6);
        }
        assert_optimal(&problem, &solution);
    }
}

#[test]
fn methods_agree_on_random_instances() {
    let mut rng = StdRng::seed_from_u64(2024);
    for round in 0..50 {
        let n = rng.gen_range(1..80);
        let problem = random_problem(&mut rng, n);
        let slow = solve_quadratic_rap(&problem, RapMethod::Bisection, &RapOptions::default())
            .unwrap_or_else(|err| panic!("round {round}: {err}"));
        let fast = solve_quadratic_rap(&problem, RapMethod::Brucker, &RapOptions::default())
            .unwrap_or_else(|err| panic!("round {round}: {err}"));
        assert_optimal(&problem, &slow);
        assert_optimal(&problem, &fast);
        let gap = (problem.objective(&slow.x) - problem.objective(&fast.x)).abs();
        assert!(gap <= 1e-6 * problem.objective(&slow.x).abs().max(1.0), "round {round}: gap {gap}");
    }
}

#[test]
fn repeated_thresholds_are_handled() {
    // Every item shares both thresholds, so breakpoints tie in value.
    let problem =
        QuadraticRap::new(vec![2.0; 8], vec![1.0; 8], 12.0, vec![0.0; 8], vec![3.0; 8]).unwrap();
    for method in METHODS {
        let solution = solve_quadratic_rap(&problem, method, &RapOptions::default()).unwrap();
        for &xi in &solution.x {
            assert!((xi - 1.5).abs() < 1e-6);
        }
    }
}

#[test]
fn infeasible_budgets_are_reported_by_both_methods() {
    let problem =
        QuadraticRap::new(vec![1.0; 3], vec![0.0; 3], 40.0, vec![1.0; 3], vec![10.0; 3]).unwrap();
    for method in METHODS {
        let err = solve_quadratic_rap(&problem, method, &RapOptions::default()).unwrap_err();
        assert_eq!(
            err,
            RapError::Infeasible {
                budget: 40.0,
                lower_total: 3.0,
                upper_total: 30.0
            }
        );
    }
}

#[test]
fn quadratic_catalogue_costs_build_instances() {
    let costs: Vec<_> = (0..6)
        .map(|i| CostKind::Quadratic.build(0.5 + i as f64, -(i as f64)))
        .collect();
    let problem = QuadraticRap::from_costs(&costs, 9.0, vec![0.0; 6], vec![5.0; 6]).unwrap();
    let solution = solve_quadratic_rap(&problem, RapMethod::Brucker, &RapOptions::default()).unwrap();
    assert_optimal(&problem, &solution);
}

proptest! {
    #[test]
    fn brucker_matches_bisection(
        seed in any::<u64>(),
        n in 1usize..40,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let problem = random_problem(&mut rng, n);
        let slow = solve_quadratic_rap(&problem, RapMethod::Bisection, &RapOptions::default()).unwrap();
        let fast = solve_quadratic_rap(&problem, RapMethod::Brucker, &RapOptions::default()).unwrap();
        for (lhs, rhs) in slow.x.iter().zip(fast.x.iter()) {
            prop_assert!((lhs - rhs).abs() <= 1e-5, "{} vs {}", lhs, rhs);
        }
    }
}
