//! Exact solvers for separable convex resource allocation with nested
//! (prefix) constraints.
//!
//! The crate bundles three kernels:
//!
//! - [`data_structures::RangeTree`]: lazy range-add / range-min over a fixed array.
//! - [`rap`]: continuous quadratic resource allocation, by dual bisection and by
//!   Brucker's linear-time breakpoint search built on [`data_structures::select`].
//! - [`lot_sizing`]: capacitated convex lot-sizing solved with a capacity-scaled
//!   successive shortest path algorithm.
//!
//! Every solve call is synchronous and owns its working buffers, so independent
//! calls can run on separate threads.

pub mod cost;
pub mod data_structures;
pub mod lot_sizing;
pub mod numerics;
pub mod rap;

pub use cost::{CostFn, CostFunction, CostKind};
pub use data_structures::{RangeMin, RangeTree};
pub use lot_sizing::{
    solve_lot_sizing, LotSizingOptions, LotSizingProblem, LotSizingSolution, ScalingPhase,
    ScalingStats,
};
pub use rap::{solve_quadratic_rap, QuadraticRap, RapMethod, RapOptions, RapSolution};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeTreeError {
    #[error("range [{from}, {to}] is invalid for a tree of length {len}")]
    InvalidRange { from: usize, to: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RapError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("quadratic coefficient a[{index}] = {value} must be positive and finite")]
    InvalidCoefficient { index: usize, value: f64 },
    #[error("budget {budget} cannot be met within bounds [{lower_total}, {upper_total}]")]
    Infeasible {
        budget: f64,
        lower_total: f64,
        upper_total: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotSizingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("demand of period {period} cannot be met ({remaining} units outstanding)")]
    Infeasible { period: usize, remaining: i64 },
    #[error(transparent)]
    Range(#[from] RangeTreeError),
}
