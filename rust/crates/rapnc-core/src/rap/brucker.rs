use std::cmp::Ordering;

use tracing::{trace, trace_span};

use super::{QuadraticRap, RapOptions, RapSolution};
use crate::data_structures::select;
use crate::RapError;

/// Which bound an item leaves or reaches when `λ` crosses the breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BreakpointKind {
    /// The item leaves its upper bound and becomes free.
    Upper,
    /// The item stops being free and settles on its lower bound.
    Lower,
}

#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    value: f64,
    id: usize,
    kind: BreakpointKind,
}

impl PartialEq for Breakpoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Breakpoint {}

impl Ord for Breakpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for Breakpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Running sums over the breakpoints already crossed.
///
/// Past those breakpoints the primal sum is `pinned - λ·inv_curvature - shift`.
#[derive(Debug, Clone, Copy)]
struct Aggregates {
    /// Σ bᵢ/aᵢ over free items.
    shift: f64,
    /// Σ 1/aᵢ over free items.
    inv_curvature: f64,
    /// Σ of the bounds of items pinned at upper or lower.
    pinned: f64,
    /// Number of free items; batches are crossed unordered, so it may dip below zero midway.
    free: i64,
}

impl Aggregates {
    fn cross(&mut self, problem: &QuadraticRap, breakpoint: &Breakpoint) {
        let i = breakpoint.id;
        let inv = 1.0 / problem.a[i];
        let ratio = problem.b[i] / problem.a[i];
        match breakpoint.kind {
            BreakpointKind::Upper => {
                self.pinned -= problem.upper[i];
                self.inv_curvature += inv;
                self.shift += ratio;
                self.free += 1;
            }
            BreakpointKind::Lower => {
                self.pinned += problem.lower[i];
                self.inv_curvature -= inv;
                self.shift -= ratio;
                self.free -= 1;
            }
        }
    }

    fn primal_sum(&self, dual: f64) -> f64 {
        self.pinned - dual * self.inv_curvature - self.shift
    }
}

/// Brucker's `O(n)` method.
///
/// Bisects over the rank of the `2n` breakpoints instead of over real values:
/// each step selects the breakpoint at the middle rank of the remaining window,
/// evaluates the primal sum there from the running aggregates, and keeps the
/// half that contains the optimal multiplier. Selection partitions the window,
/// so the aggregates only ever need the breakpoints between the window start
/// and the probe, and the total work stays linear.
pub fn brucker(problem: &QuadraticRap, opts: &RapOptions) -> Result<RapSolution, RapError> {
    let n = problem.dimension();
    let _span = trace_span!("rap_brucker", n).entered();
    problem.check_budget(opts.tolerance)?;
    if n == 0 {
        return Ok(RapSolution {
            x: Vec::new(),
            dual: 0.0,
            iterations: 0,
        });
    }

    let budget = problem.budget;
    let mut breakpoints = Vec::with_capacity(2 * n);
    for i in 0..n {
        breakpoints.push(Breakpoint {
            value: problem.upper_threshold(i),
            id: i,
            kind: BreakpointKind::Upper,
        });
        breakpoints.push(Breakpoint {
            value: problem.lower_threshold(i),
            id: i,
            kind: BreakpointKind::Lower,
        });
    }

    let mut crossed = Aggregates {
        shift: 0.0,
        inv_curvature: 0.0,
        pinned: problem.upper_total(),
        free: 0,
    };
    let mut start = 0;
    let mut end = breakpoints.len() - 1;
    let mut iterations = 0;

    while start + 1 < end {
        let mid = start + (end - start) / 2;
        // start < mid < end, so the rank always lies inside the window.
        let Some(probe) = select(&mut breakpoints, start, end, mid - start + 1) else {
            break;
        };

        let mut trial = crossed;
        for breakpoint in &breakpoints[start..mid] {
            trial.cross(problem, breakpoint);
        }
        let sum = trial.primal_sum(probe.value);
        iterations += 1;
        trace!(start, end, probe = probe.value, sum, "brucker step");

        if sum >= budget {
            start = mid;
            crossed = trial;
        } else {
            end = mid;
        }
    }

    // A two-element window is never partitioned by the loop.
    if breakpoints[end] < breakpoints[start] {
        breakpoints.swap(start, end);
    }
    let low = breakpoints[start];
    let high = breakpoints[end];
    crossed.cross(problem, &low);

    let dual = if crossed.free <= 0 {
        low.value
    } else {
        let dual = (crossed.pinned - crossed.shift - budget) / crossed.inv_curvature;
        if dual.is_finite() {
            dual.clamp(low.value, high.value)
        } else {
            low.value
        }
    };

    Ok(RapSolution {
        x: problem.allocation(dual),
        dual,
        iterations,
    })
}
