//! Small statistics helpers shared by the analyzers
//!
//! Single-variable regression over a handful of monthly totals does not need a
//! statistics package; the closed-form sums are enough. NaN results are legal
//! outputs here (fewer than two points, or a flat series) and callers route
//! them through their fallback paths.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a currency amount to 2 decimal places, half-up
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to `dp` decimal places, half-up
pub(crate) fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Arithmetic mean, unrounded. None for an empty slice.
pub(crate) fn decimal_mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(sum / Decimal::from(values.len() as i64))
}

/// Population standard deviation (divisor n, not n-1) around a given mean
pub(crate) fn population_std_dev(values: &[Decimal], mean: Decimal) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| {
            let diff = (*v - mean).to_f64().unwrap_or_default();
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Ordinary-least-squares line fit over a series indexed 0..n-1
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; NaN when the series has no variance
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = slope * index + intercept` from sums of x, y, xy, x².
///
/// Fewer than two points cannot determine a line; slope, intercept, and R²
/// all come back NaN in that case.
pub(crate) fn fit_line(ys: &[f64]) -> LinearFit {
    if ys.len() < 2 {
        return LinearFit {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
        };
    }

    let n = ys.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return LinearFit {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
        };
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let fitted = slope * i as f64 + intercept;
        ss_tot += (y - mean_y) * (y - mean_y);
        ss_res += (y - fitted) * (y - fitted);
    }

    let r_squared = if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}
