//! Metrics for evaluating forecast performance
//!
//! All functions take predicted/actual slices of equal length. Mismatched or
//! empty inputs yield `NaN` rather than an error so callers can decide how to
//! treat degenerate slices.

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    (sum / actual.len() as f64).sqrt()
}

/// Coefficient of determination. A constant actual series (zero total sum of
/// squares) scores 0.0 rather than dividing by zero.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot.abs() < 1e-10 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Weighted mean absolute percentage error, as a percentage.
///
/// The denominator is the sum of absolute actuals floored at 1.0, so an
/// all-zero actual series yields a finite, non-negative value.
pub fn wmape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let abs_error: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    let abs_actual: f64 = actual.iter().map(|a| a.abs()).sum();

    abs_error / abs_actual.max(1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn wmape_floors_denominator_at_one() {
        let actual = vec![0.0, 0.0, 0.0];
        let predicted = vec![1.0, 2.0, 3.0];

        let value = wmape(&actual, &predicted);
        assert!(value.is_finite());
        assert_approx_eq!(value, 600.0, 1e-9);
    }

    #[test]
    fn r_squared_on_constant_actuals_is_zero() {
        let actual = vec![5.0, 5.0, 5.0];
        let predicted = vec![5.0, 5.0, 5.0];
        assert_approx_eq!(r_squared(&actual, &predicted), 0.0, 1e-12);
    }
}
