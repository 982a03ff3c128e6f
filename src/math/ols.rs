//! Simple ordinary least squares.
//!
//! We only ever regress one feature with an intercept:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! so the closed form on centred data is enough:
//! - `b = Σ(dx dy) / Σ(dx^2)`
//! - `a = ȳ - b x̄`
//!
//! Centring first keeps the sums well-conditioned for log-return sized inputs.

use crate::domain::LinearFit;
use crate::error::FitError;

/// Minimum number of points for a defined OLS fit.
pub const MIN_FIT_POINTS: usize = 2;

/// Fit `y = slope * x + intercept` and compute r² on the same points.
///
/// If every `x` is identical the slope is 0 and the intercept is the mean of `y`
/// (the minimum-norm least squares solution).
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::InvalidInput(format!(
            "x and y lengths differ ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < MIN_FIT_POINTS {
        return Err(FitError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: n,
        });
    }

    let nf = n as f64;
    let x_bar = x.iter().sum::<f64>() / nf;
    let y_bar = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_bar;
        sxx += dx * dx;
        sxy += dx * (yi - y_bar);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = y_bar - slope * x_bar;

    let mut fit = LinearFit {
        slope,
        intercept,
        r_squared: 0.0,
        n,
    };
    fit.r_squared = r_squared(&fit, x, y, y_bar);
    Ok(fit)
}

/// `1 - SS_res / SS_tot`, or 0 when every `y` is identical.
fn r_squared(fit: &LinearFit, x: &[f64], y: &[f64], y_bar: f64) -> f64 {
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let r = yi - fit.predict(xi);
        ss_res += r * r;
        ss_tot += (yi - y_bar) * (yi - y_bar);
    }
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Residuals `y - fit.predict(x)`.
pub fn residuals(fit: &LinearFit, x: &[f64], y: &[f64]) -> Vec<f64> {
    x.iter().zip(y).map(|(&xi, &yi)| yi - fit.predict(xi)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exact_line() {
        // y = 2 + 3x on x = [0,1,2]
        let fit = fit_line(&[0.0, 1.0, 2.0], &[2.0, 5.0, 8.0]).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.n, 3);
    }

    #[test]
    fn leverage_point_dominates_baseline() {
        let x = [1.0, 2.0, 3.0, 4.0, 100.0];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        let fit = fit_line(&x, &y).unwrap();
        // Σdxdy = 200, Σdx² = 7610
        assert!((fit.slope - 200.0 / 7610.0).abs() < 1e-12);
        let r = residuals(&fit, &x, &y);
        assert!(r[4].abs() < 0.1);
    }

    #[test]
    fn two_points_is_enough() {
        let fit = fit_line(&[1.0, 3.0], &[1.0, 10.0]).unwrap();
        assert!((fit.slope - 4.5).abs() < 1e-12);
        assert!((fit.intercept + 3.5).abs() < 1e-12);
    }

    #[test]
    fn one_point_is_insufficient() {
        let err = fit_line(&[1.0], &[1.0]).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { required: 2, actual: 1 });
    }

    #[test]
    fn constant_y_has_zero_r_squared() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn constant_x_falls_back_to_mean() {
        let fit = fit_line(&[2.0, 2.0, 2.0], &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        assert!(matches!(
            fit_line(&[1.0, 2.0], &[1.0]),
            Err(FitError::InvalidInput(_))
        ));
    }
}
