//! Capacitated convex lot-sizing, the network-flow form of RAPNC.
//!
//! Period `t` produces `xₜ` units within `production_caps[t]`; surplus is
//! carried to period `t + 1` through an inventory arc of capacity
//! `inventory_caps[t]`, and every demand must be met on time. The objective
//! `Σ costₜ(xₜ)` is separable and convex, so marginal costs never decrease.

mod ssp;

pub use ssp::ssp;

use tracing::{debug, debug_span};

use crate::cost::CostFunction;
use crate::numerics::kahan_sum;
use crate::LotSizingError;

#[derive(Debug, Clone)]
pub struct LotSizingOptions {
    /// Run the geometric step-size schedule before the final unit-step pass.
    pub capacity_scaling: bool,
    /// Overrides the first step size, `ceil(total demand / 2n)` by default.
    pub initial_step: Option<i64>,
}

impl Default for LotSizingOptions {
    fn default() -> Self {
        Self {
            capacity_scaling: true,
            initial_step: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingPhase {
    pub phase: usize,
    pub step: i64,
    pub augmentations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalingStats {
    pub phases: Vec<ScalingPhase>,
}

impl ScalingStats {
    pub fn total_augmentations(&self) -> usize {
        self.phases.iter().map(|phase| phase.augmentations).sum()
    }
}

#[derive(Debug, Clone)]
pub struct LotSizingSolution {
    pub flow: Vec<i64>,
    pub cost: f64,
    pub stats: ScalingStats,
}

#[derive(Debug, Clone)]
pub struct LotSizingProblem {
    pub demands: Vec<i64>,
    pub production_caps: Vec<i64>,
    /// Arc `t` carries stock from period `t` to `t + 1`; length `n - 1`.
    pub inventory_caps: Vec<i64>,
    total_demand: i64,
}

impl LotSizingProblem {
    pub fn new(
        demands: Vec<i64>,
        production_caps: Vec<i64>,
        inventory_caps: Vec<i64>,
    ) -> Result<Self, LotSizingError> {
        let n = demands.len();
        if production_caps.len() != n {
            return Err(LotSizingError::InvalidInput(
                "production capacities must match the number of periods".to_string(),
            ));
        }
        if inventory_caps.len() != n.saturating_sub(1) {
            return Err(LotSizingError::InvalidInput(
                "inventory capacities must have one entry per consecutive period pair".to_string(),
            ));
        }
        if demands
            .iter()
            .chain(production_caps.iter())
            .chain(inventory_caps.iter())
            .any(|&value| value < 0)
        {
            return Err(LotSizingError::InvalidInput(
                "demands and capacities must be nonnegative".to_string(),
            ));
        }
        let total_demand = demands
            .iter()
            .try_fold(0_i64, |acc, &d| acc.checked_add(d))
            .ok_or_else(|| LotSizingError::InvalidInput("total demand overflows".to_string()))?;
        Ok(Self {
            demands,
            production_caps,
            inventory_caps,
            total_demand,
        })
    }

    pub fn period_count(&self) -> usize {
        self.demands.len()
    }

    pub fn total_demand(&self) -> i64 {
        self.total_demand
    }

    pub fn objective<C: CostFunction>(&self, costs: &[C], flow: &[i64]) -> f64 {
        kahan_sum(
            costs
                .iter()
                .zip(flow.iter())
                .map(|(cost, &x)| cost.value(x as f64)),
        )
    }

    /// Checks `flow` against every capacity and demand constraint, exactly.
    pub fn check_flow(&self, flow: &[i64]) -> Result<(), LotSizingError> {
        let n = self.period_count();
        if flow.len() != n {
            return Err(LotSizingError::InvalidInput(format!(
                "flow has {} entries for {n} periods",
                flow.len()
            )));
        }
        let mut stock = 0_i64;
        for t in 0..n {
            if flow[t] < 0 || flow[t] > self.production_caps[t] {
                return Err(LotSizingError::InvalidInput(format!(
                    "production {} in period {t} outside [0, {}]",
                    flow[t], self.production_caps[t]
                )));
            }
            stock += flow[t] - self.demands[t];
            if stock < 0 {
                return Err(LotSizingError::InvalidInput(format!(
                    "demand of period {t} is short by {}",
                    -stock
                )));
            }
            let arc_cap = self.inventory_caps.get(t).copied().unwrap_or(0);
            if stock > arc_cap {
                return Err(LotSizingError::InvalidInput(format!(
                    "stock {stock} after period {t} exceeds capacity {arc_cap}"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_costs<C>(&self, costs: &[C]) -> Result<(), LotSizingError> {
        if costs.len() != self.period_count() {
            return Err(LotSizingError::InvalidInput(format!(
                "{} cost functions for {} periods",
                costs.len(),
                self.period_count()
            )));
        }
        Ok(())
    }
}

/// `ceil(total / 2n)`, the first step of the scaling schedule.
pub fn initial_step(total_demand: i64, periods: usize) -> i64 {
    let denom = 2 * periods.max(1) as i64;
    if total_demand <= 0 {
        0
    } else {
        (total_demand - 1) / denom + 1
    }
}

/// Solves the instance with capacity-scaled successive shortest paths.
///
/// Each phase runs [`ssp`] with step `s`, then lowers every period's flow by
/// `s` (clamped at zero) and halves `s`, rounding up. The final pass uses
/// step one and is exact; earlier phases only produce a warm start that stays
/// below an optimal flow.
pub fn solve_lot_sizing<C: CostFunction>(
    problem: &LotSizingProblem,
    costs: &[C],
    opts: &LotSizingOptions,
) -> Result<LotSizingSolution, LotSizingError> {
    problem.check_costs(costs)?;
    let n = problem.period_count();
    let _span = debug_span!("lot_sizing", n, total_demand = problem.total_demand()).entered();

    let mut flow = vec![0_i64; n];
    let mut stats = ScalingStats::default();

    if opts.capacity_scaling {
        let mut step = match opts.initial_step {
            Some(step) if step < 1 => {
                return Err(LotSizingError::InvalidInput(
                    "initial step must be at least one".to_string(),
                ))
            }
            Some(step) => step,
            None => initial_step(problem.total_demand(), n),
        };
        while step > 1 {
            let augmentations = ssp(problem, costs, step, &mut flow)?;
            debug!(phase = stats.phases.len(), step, augmentations, "scaling phase done");
            stats.phases.push(ScalingPhase {
                phase: stats.phases.len(),
                step,
                augmentations,
            });
            for value in flow.iter_mut() {
                *value = (*value - step).max(0);
            }
            step = step / 2 + step % 2;
        }
    }

    let augmentations = ssp(problem, costs, 1, &mut flow)?;
    debug!(phase = stats.phases.len(), augmentations, "unit step phase done");
    stats.phases.push(ScalingPhase {
        phase: stats.phases.len(),
        step: 1,
        augmentations,
    });

    let cost = problem.objective(costs, &flow);
    Ok(LotSizingSolution { flow, cost, stats })
}
