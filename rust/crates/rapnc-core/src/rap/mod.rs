//! Continuous quadratic resource allocation:
//! minimize `Σ aᵢ/2·xᵢ² + bᵢ·xᵢ` subject to `lb ≤ x ≤ ub` and `Σxᵢ = B`.
//!
//! Both solvers search the multiplier `λ` of the budget constraint. For a
//! fixed `λ` item `i` takes `clamp(-(λ + bᵢ)/aᵢ, lbᵢ, ubᵢ)`, which is
//! nonincreasing in `λ`; it sits at `ubᵢ` up to the upper threshold
//! `-aᵢ·ubᵢ - bᵢ` and at `lbᵢ` from the lower threshold `-aᵢ·lbᵢ - bᵢ` on.

mod bisection;
mod brucker;

pub use bisection::bisection;
pub use brucker::brucker;

use crate::cost::{quadratic_coefficients, CostFunction};
use crate::numerics::{kahan_sum, residual_tolerance, EPSILON};
use crate::RapError;

#[derive(Debug, Clone)]
pub struct RapOptions {
    pub tolerance: f64,
    pub max_iters: usize,
}

impl Default for RapOptions {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            max_iters: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RapMethod {
    Bisection,
    Brucker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RapSolution {
    pub x: Vec<f64>,
    /// Budget multiplier `λ` at which `x` was read off.
    pub dual: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub struct QuadraticRap {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub budget: f64,
}

impl QuadraticRap {
    pub fn new(
        a: Vec<f64>,
        b: Vec<f64>,
        budget: f64,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self, RapError> {
        let n = a.len();
        if b.len() != n || lower.len() != n || upper.len() != n {
            return Err(RapError::InvalidInput(
                "coefficient and bound arrays must have identical length".to_string(),
            ));
        }
        if !budget.is_finite() {
            return Err(RapError::InvalidInput("budget must be finite".to_string()));
        }
        for (index, &value) in a.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(RapError::InvalidCoefficient { index, value });
            }
        }
        if b.iter().any(|value| !value.is_finite()) {
            return Err(RapError::InvalidInput(
                "linear coefficients must be finite".to_string(),
            ));
        }
        for (&lo, &up) in lower.iter().zip(upper.iter()) {
            if !lo.is_finite() || !up.is_finite() {
                return Err(RapError::InvalidInput("bounds must be finite".to_string()));
            }
            if lo > up {
                return Err(RapError::InvalidInput(
                    "lower bound exceeds upper bound".to_string(),
                ));
            }
        }
        Ok(Self {
            a,
            b,
            lower,
            upper,
            budget,
        })
    }

    /// Builds an instance by reading each cost as `aᵢ/2·x² + bᵢ·x` off its
    /// values at `-1`, `0` and `1`.
    pub fn from_costs<C: CostFunction>(
        costs: &[C],
        budget: f64,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self, RapError> {
        let (a, b) = costs.iter().map(quadratic_coefficients).unzip();
        Self::new(a, b, budget, lower, upper)
    }

    pub fn dimension(&self) -> usize {
        self.a.len()
    }

    pub fn lower_total(&self) -> f64 {
        kahan_sum(self.lower.iter().copied())
    }

    pub fn upper_total(&self) -> f64 {
        kahan_sum(self.upper.iter().copied())
    }

    pub fn lower_threshold(&self, i: usize) -> f64 {
        -self.a[i] * self.lower[i] - self.b[i]
    }

    pub fn upper_threshold(&self, i: usize) -> f64 {
        -self.a[i] * self.upper[i] - self.b[i]
    }

    pub fn allocation_at(&self, dual: f64, i: usize) -> f64 {
        if dual >= self.lower_threshold(i) {
            self.lower[i]
        } else if dual <= self.upper_threshold(i) {
            self.upper[i]
        } else {
            -(dual + self.b[i]) / self.a[i]
        }
    }

    pub fn allocation(&self, dual: f64) -> Vec<f64> {
        (0..self.dimension())
            .map(|i| self.allocation_at(dual, i))
            .collect()
    }

    pub fn primal_sum(&self, dual: f64) -> f64 {
        kahan_sum((0..self.dimension()).map(|i| self.allocation_at(dual, i)))
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        kahan_sum(
            x.iter()
                .zip(self.a.iter().zip(self.b.iter()))
                .map(|(&xi, (&ai, &bi))| ai / 2.0 * xi * xi + bi * xi),
        )
    }

    pub(crate) fn infeasible(&self) -> RapError {
        RapError::Infeasible {
            budget: self.budget,
            lower_total: self.lower_total(),
            upper_total: self.upper_total(),
        }
    }

    pub(crate) fn check_budget(&self, tolerance: f64) -> Result<(), RapError> {
        let slack = residual_tolerance(tolerance, self.budget);
        if self.budget < self.lower_total() - slack || self.budget > self.upper_total() + slack {
            tracing::debug!(
                budget = self.budget,
                lower_total = self.lower_total(),
                upper_total = self.upper_total(),
                "quadratic allocation budget outside bound totals"
            );
            return Err(self.infeasible());
        }
        Ok(())
    }
}

pub fn solve_quadratic_rap(
    problem: &QuadraticRap,
    method: RapMethod,
    opts: &RapOptions,
) -> Result<RapSolution, RapError> {
    match method {
        RapMethod::Bisection => bisection(problem, opts),
        RapMethod::Brucker => brucker(problem, opts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostFn;

    fn symmetric(n: usize, budget: f64) -> QuadraticRap {
        QuadraticRap::new(
            vec![1.0; n],
            vec![0.0; n],
            budget,
            vec![0.0; n],
            vec![10.0; n],
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_positive_coefficients() {
        let err = QuadraticRap::new(vec![1.0, 0.0], vec![0.0; 2], 1.0, vec![0.0; 2], vec![1.0; 2])
            .unwrap_err();
        assert_eq!(err, RapError::InvalidCoefficient { index: 1, value: 0.0 });
    }

    #[test]
    fn rejects_inverted_bounds_and_length_mismatch() {
        assert!(matches!(
            QuadraticRap::new(vec![1.0], vec![0.0], 1.0, vec![2.0], vec![1.0]),
            Err(RapError::InvalidInput(_))
        ));
        assert!(matches!(
            QuadraticRap::new(vec![1.0], vec![0.0, 1.0], 1.0, vec![0.0], vec![1.0]),
            Err(RapError::InvalidInput(_))
        ));
    }

    #[test]
    fn thresholds_bracket_the_interior() {
        let problem = symmetric(1, 5.0);
        assert_eq!(problem.upper_threshold(0), -10.0);
        assert_eq!(problem.lower_threshold(0), 0.0);
        assert_eq!(problem.allocation_at(-20.0, 0), 10.0);
        assert_eq!(problem.allocation_at(-4.0, 0), 4.0);
        assert_eq!(problem.allocation_at(3.0, 0), 0.0);
    }

    #[test]
    fn reads_coefficients_from_cost_functions() {
        let costs = vec![
            CostFn::Quadratic { a: 0.5, b: 1.0 },
            CostFn::Quadratic { a: 2.0, b: -3.0 },
        ];
        let problem = QuadraticRap::from_costs(&costs, 4.0, vec![0.0; 2], vec![4.0; 2]).unwrap();
        assert!((problem.a[0] - 1.0).abs() < 1e-12);
        assert!((problem.a[1] - 4.0).abs() < 1e-12);
        assert!((problem.b[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn linear_costs_are_rejected_as_degenerate() {
        let costs = vec![CostFn::Linear { b: 1.0 }];
        let err = QuadraticRap::from_costs(&costs, 1.0, vec![0.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, RapError::InvalidCoefficient { index: 0, .. }));
    }

    #[test]
    fn both_methods_split_symmetric_budget_evenly() {
        let problem = symmetric(5, 25.0);
        for method in [RapMethod::Bisection, RapMethod::Brucker] {
            let solution = solve_quadratic_rap(&problem, method, &RapOptions::default()).unwrap();
            for &xi in &solution.x {
                assert!((xi - 5.0).abs() < 1e-6, "{method:?} returned {xi}");
            }
        }
    }

    #[test]
    fn objective_matches_closed_form() {
        let problem = symmetric(2, 4.0);
        assert_eq!(problem.objective(&[2.0, 2.0]), 4.0);
    }
}
