pub const EPSILON: f64 = 1e-9;

/// Residual tolerance for a budget equation `Σx = B`.
///
/// Absolute for budgets of magnitude up to one, relative above that.
pub fn residual_tolerance(tolerance: f64, budget: f64) -> f64 {
    tolerance * budget.abs().max(1.0)
}

pub fn kahan_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for value in values {
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_tolerance_scales_with_budget() {
        assert_eq!(residual_tolerance(EPSILON, 0.5), EPSILON);
        assert!((residual_tolerance(EPSILON, 1e6) - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn kahan_sum_keeps_small_terms() {
        let values = std::iter::once(1e16).chain(std::iter::repeat(1.0).take(10));
        assert_eq!(kahan_sum(values), 1e16 + 10.0);
    }
}
