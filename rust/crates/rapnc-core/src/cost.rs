use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Offset used by the shifted hyperbolic costs so they stay finite at zero.
pub const HYPERBOLIC_OFFSET: f64 = 0.01;

/// A per-period cost oracle, convex on the nonnegative reals.
pub trait CostFunction {
    fn value(&self, x: f64) -> f64;

    /// Discrete marginal cost `f(q + 1) - f(q)` of the next unit after `q`.
    fn marginal(&self, q: i64) -> f64 {
        let q = q as f64;
        self.value(q + 1.0) - self.value(q)
    }
}

impl<T: CostFunction + ?Sized> CostFunction for &T {
    fn value(&self, x: f64) -> f64 {
        (**self).value(x)
    }
}

impl<T: CostFunction + ?Sized> CostFunction for Box<T> {
    fn value(&self, x: f64) -> f64 {
        (**self).value(x)
    }
}

/// Built-in cost families parameterised by `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostFn {
    /// `b·x`
    Linear { b: f64 },
    /// `a·x² + b·x`
    Quadratic { a: f64, b: f64 },
    /// `x⁴/4 + b·x`
    QuarticLinear { b: f64 },
    /// `a·b² / x³`
    Fuel { a: f64, b: f64 },
    /// `10·b + a / x`
    Crash { a: f64, b: f64 },
    /// `a·b² / (x + 0.01)³`
    ShiftedFuel { a: f64, b: f64 },
    /// `10·b + a / (x + 0.01)`
    ShiftedCrash { a: f64, b: f64 },
}

impl CostFunction for CostFn {
    fn value(&self, x: f64) -> f64 {
        match *self {
            CostFn::Linear { b } => b * x,
            CostFn::Quadratic { a, b } => a * x * x + b * x,
            CostFn::QuarticLinear { b } => x * x * x * x / 4.0 + b * x,
            CostFn::Fuel { a, b } => a * b * b / x / x / x,
            CostFn::Crash { a, b } => 10.0 * b + a / x,
            CostFn::ShiftedFuel { a, b } => {
                let shifted = x + HYPERBOLIC_OFFSET;
                a * b * b / shifted / shifted / shifted
            }
            CostFn::ShiftedCrash { a, b } => 10.0 * b + a / (x + HYPERBOLIC_OFFSET),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostKind {
    Linear,
    Quadratic,
    QuarticLinear,
    Fuel,
    Crash,
    ShiftedFuel,
    ShiftedCrash,
}

impl CostKind {
    pub const ALL: [CostKind; 7] = [
        CostKind::Linear,
        CostKind::Quadratic,
        CostKind::QuarticLinear,
        CostKind::Fuel,
        CostKind::Crash,
        CostKind::ShiftedFuel,
        CostKind::ShiftedCrash,
    ];

    pub fn build(self, a: f64, b: f64) -> CostFn {
        match self {
            CostKind::Linear => CostFn::Linear { b },
            CostKind::Quadratic => CostFn::Quadratic { a, b },
            CostKind::QuarticLinear => CostFn::QuarticLinear { b },
            CostKind::Fuel => CostFn::Fuel { a, b },
            CostKind::Crash => CostFn::Crash { a, b },
            CostKind::ShiftedFuel => CostFn::ShiftedFuel { a, b },
            CostKind::ShiftedCrash => CostFn::ShiftedCrash { a, b },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CostKind::Linear => "linear",
            CostKind::Quadratic => "quadratic",
            CostKind::QuarticLinear => "f",
            CostKind::Fuel => "fuel",
            CostKind::Crash => "crash",
            CostKind::ShiftedFuel => "Con_FUEL",
            CostKind::ShiftedCrash => "Con_CRASH",
        }
    }
}

impl fmt::Display for CostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cost function kind `{0}`")]
pub struct UnknownCostKind(pub String);

impl FromStr for CostKind {
    type Err = UnknownCostKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(CostKind::Linear),
            "quadratic" => Ok(CostKind::Quadratic),
            "f" | "Con_F" => Ok(CostKind::QuarticLinear),
            "fuel" => Ok(CostKind::Fuel),
            "crash" => Ok(CostKind::Crash),
            "Con_FUEL" => Ok(CostKind::ShiftedFuel),
            "Con_CRASH" => Ok(CostKind::ShiftedCrash),
            other => Err(UnknownCostKind(other.to_string())),
        }
    }
}

/// Recovers `(a, b)` of a cost `a/2·x² + b·x + c` from three evaluations.
pub fn quadratic_coefficients<C: CostFunction + ?Sized>(cost: &C) -> (f64, f64) {
    let plus = cost.value(1.0);
    let minus = cost.value(-1.0);
    let zero = cost.value(0.0);
    (plus + minus - 2.0 * zero, (plus - minus) / 2.0)
}
