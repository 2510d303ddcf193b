use tracing::{debug, trace, trace_span};

use super::LotSizingProblem;
use crate::cost::CostFunction;
use crate::data_structures::{PathIndex, RangeTree};
use crate::LotSizingError;

/// Residual network left after routing a warm-start flow.
struct Residual {
    production: Vec<i64>,
    demand: Vec<i64>,
    inventory: Vec<i64>,
}

impl Residual {
    /// Routes `flow` greedily: each period's output serves its own demand
    /// first and any surplus is carried forward to the next period.
    fn after(problem: &LotSizingProblem, flow: &[i64]) -> Result<Self, LotSizingError> {
        let n = problem.period_count();
        let mut production = problem.production_caps.clone();
        let mut demand = problem.demands.clone();
        let mut inventory = problem.inventory_caps.clone();
        let mut surplus = 0_i64;

        for t in 0..n {
            if flow[t] < 0 || flow[t] > production[t] {
                return Err(LotSizingError::InvalidInput(format!(
                    "warm start produces {} in period {t} outside [0, {}]",
                    flow[t], production[t]
                )));
            }
            production[t] -= flow[t];
            let available = surplus + flow[t];
            if available <= demand[t] {
                demand[t] -= available;
                surplus = 0;
            } else {
                surplus = available - demand[t];
                demand[t] = 0;
            }
            if surplus > 0 {
                match inventory.get_mut(t) {
                    Some(cap) if *cap >= surplus => *cap -= surplus,
                    _ => {
                        return Err(LotSizingError::InvalidInput(format!(
                            "warm start carries {surplus} units past period {t} beyond capacity"
                        )))
                    }
                }
            }
        }

        Ok(Self {
            production,
            demand,
            inventory,
        })
    }
}

/// One successive-shortest-path pass with augmentations capped at `step`.
///
/// `flow` is the warm start on entry and the augmented flow on return. Demand
/// is served period by period; for period `t` the cheapest open production
/// period `s ≤ t` is drawn from the path index, and the augmentation is bounded
/// by its residual capacity, by the outstanding demand, by `step` and by the
/// tightest inventory arc between `s` and `t`. Saturating that arc closes
/// every period up to it for the rest of the pass.
///
/// Returns the number of augmentations performed.
pub fn ssp<C: CostFunction>(
    problem: &LotSizingProblem,
    costs: &[C],
    step: i64,
    flow: &mut [i64],
) -> Result<usize, LotSizingError> {
    let n = problem.period_count();
    problem.check_costs(costs)?;
    if flow.len() != n {
        return Err(LotSizingError::InvalidInput(format!(
            "warm start has {} entries for {n} periods",
            flow.len()
        )));
    }
    if step < 1 {
        return Err(LotSizingError::InvalidInput(
            "augmentation step must be at least one".to_string(),
        ));
    }
    let _span = trace_span!("ssp", n, step).entered();

    let Residual {
        mut production,
        mut demand,
        inventory,
    } = Residual::after(problem, flow)?;
    let mut arcs = RangeTree::new(&inventory);
    let mut open = PathIndex::with_capacity(n);
    let mut first_open = 0;
    let mut augmentations = 0;

    for t in 0..n {
        if production[t] > 0 {
            open.insert(t, costs[t].marginal(flow[t]));
        }
        while demand[t] > 0 {
            let Some((source, _)) = open.pop_cheapest() else {
                debug!(period = t, remaining = demand[t], "no open production period left");
                return Err(LotSizingError::Infeasible {
                    period: t,
                    remaining: demand[t],
                });
            };
            let bottleneck = if source < t {
                Some(arcs.range_min(source, t - 1)?)
            } else {
                None
            };

            let mut delta = production[source].min(step).min(demand[t]);
            if let Some(arc) = bottleneck {
                delta = delta.min(arc.value);
            }
            demand[t] -= delta;
            production[source] -= delta;
            flow[source] += delta;
            augmentations += 1;
            trace!(period = t, source, delta, "augment");

            if production[source] > 0 {
                open.insert(source, costs[source].marginal(flow[source]));
            }
            if let Some(arc) = bottleneck {
                if delta > 0 {
                    arcs.range_add(source, t - 1, -delta)?;
                }
                if delta == arc.value {
                    for closed in first_open..=arc.index {
                        open.remove(closed);
                    }
                    first_open = arc.index + 1;
                }
            }
        }
    }

    Ok(augmentations)
}
