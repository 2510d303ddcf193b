use tracing::{debug, trace, trace_span};

use super::{QuadraticRap, RapOptions, RapSolution};
use crate::numerics::residual_tolerance;
use crate::RapError;

/// Bisection on the budget multiplier.
///
/// The bracket starts at `[min upper threshold, max lower threshold]`, where
/// the primal sum equals `Σub` and `Σlb` respectively. The search stops once
/// the bracket is narrower than `tolerance` and the primal sum matches the
/// budget, or once the bracket can no longer be split. A sum that still
/// misses the budget at that point means the instance is infeasible.
pub fn bisection(problem: &QuadraticRap, opts: &RapOptions) -> Result<RapSolution, RapError> {
    let n = problem.dimension();
    let _span = trace_span!("rap_bisection", n).entered();
    let budget = problem.budget;
    let residual_tol = residual_tolerance(opts.tolerance, budget);

    if n == 0 {
        if budget.abs() <= residual_tol {
            return Ok(RapSolution {
                x: Vec::new(),
                dual: 0.0,
                iterations: 0,
            });
        }
        return Err(problem.infeasible());
    }

    let mut left = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    for i in 0..n {
        left = left.min(problem.upper_threshold(i));
        right = right.max(problem.lower_threshold(i));
    }

    let mut iterations = 0;
    let (dual, sum) = loop {
        let mid = left + (right - left) / 2.0;
        let sum = problem.primal_sum(mid);
        iterations += 1;
        let stalled = mid <= left || mid >= right;
        if sum >= budget {
            left = mid;
        } else {
            right = mid;
        }
        trace!(iterations, left, right, sum, "bisection step");

        let converged = right - left <= opts.tolerance && (sum - budget).abs() <= residual_tol;
        if converged || stalled || iterations >= opts.max_iters {
            break (mid, sum);
        }
    };

    if (sum - budget).abs() > residual_tol {
        debug!(budget, sum, iterations, "bisection bracket collapsed away from budget");
        return Err(problem.infeasible());
    }

    Ok(RapSolution {
        x: problem.allocation(dual),
        dual,
        iterations,
    })
}
