//! Price -> log-return conversion.

use crate::error::FitError;

/// Daily log returns `ln(p[i] / p[i-1])` for `i >= 1`.
///
/// The output is one shorter than the input; the first price has no return and is
/// dropped rather than padded, so no artificial observation enters a fit.
pub fn log_returns(prices: &[f64]) -> Result<Vec<f64>, FitError> {
    if prices.len() < 2 {
        return Err(FitError::InvalidInput(format!(
            "need at least 2 prices to compute returns, got {}",
            prices.len()
        )));
    }
    if let Some(i) = prices.iter().position(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(FitError::InvalidInput(format!(
            "price at index {i} must be finite and > 0 (got {})",
            prices[i]
        )));
    }
    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_returns_are_one_shorter() {
        let r = log_returns(&[100.0, 110.0, 99.0]).unwrap();
        assert_eq!(r.len(), 2);
        assert!((r[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!((r[1] - (0.9f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        assert!(log_returns(&[1.0, 0.0, 2.0]).is_err());
        assert!(log_returns(&[1.0, f64::NAN]).is_err());
        assert!(log_returns(&[1.0]).is_err());
    }
}
