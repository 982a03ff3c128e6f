//! Residual outlier classification.
//!
//! Two textbook rules, each with a tight and a relaxed border:
//!
//! - `StdDev`: z-score against the population mean/std; relaxed uses `t + 0.1 t`.
//! - `Iqr`: Tukey fences `Q1 - t IQR`, `Q3 + t IQR`; relaxed moves each fence by 10%
//!   of its own value (`lower - 0.1 lower`, `upper + 0.1 upper`).
//!
//! The relaxed IQR fence is sign-dependent: a negative lower fence moves *towards*
//! zero, so relaxed can reject points the tight variant accepts. That arithmetic is
//! kept exactly as written.

use crate::domain::{BorderMode, OutlierStrategy};
use crate::error::FitError;
use crate::math::{population_std, quartiles};

/// Accepted values plus the per-index acceptance mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Values where `mask` is `true`, in input order.
    pub values: Vec<f64>,
    pub mask: Vec<bool>,
}

impl Classification {
    pub fn accepted_count(&self) -> usize {
        self.values.len()
    }
}

/// Validate a threshold shared by both strategies.
pub fn validate_threshold(threshold: f64) -> Result<(), FitError> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(FitError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Partition `residuals` into inliers/outliers.
pub fn classify(
    residuals: &[f64],
    strategy: OutlierStrategy,
    threshold: f64,
    border: BorderMode,
) -> Result<Classification, FitError> {
    validate_threshold(threshold)?;
    if residuals.is_empty() {
        return Err(FitError::InvalidInput("residual series is empty".to_string()));
    }
    if let Some(i) = residuals.iter().position(|r| !r.is_finite()) {
        return Err(FitError::InvalidInput(format!("non-finite residual at index {i}")));
    }

    let mask = match strategy {
        OutlierStrategy::StdDev => std_mask(residuals, threshold, border),
        OutlierStrategy::Iqr => iqr_mask(residuals, threshold, border),
    };

    let values = residuals
        .iter()
        .zip(&mask)
        .filter_map(|(&v, &keep)| if keep { Some(v) } else { None })
        .collect();

    Ok(Classification { values, mask })
}

fn std_mask(residuals: &[f64], threshold: f64, border: BorderMode) -> Vec<bool> {
    // Identical residuals have no spread. Rounding in the mean can leave a tiny
    // nonzero sigma, so check identity before computing z-scores.
    if residuals.iter().all(|&v| v == residuals[0]) {
        return vec![true; residuals.len()];
    }

    let mu = residuals.iter().sum::<f64>() / residuals.len() as f64;
    let sigma = population_std(residuals).unwrap_or(0.0);
    if sigma == 0.0 {
        return vec![true; residuals.len()];
    }

    let limit = match border {
        BorderMode::Tight => threshold,
        BorderMode::Relaxed => threshold + 0.1 * threshold,
    };

    residuals
        .iter()
        .map(|&v| ((v - mu) / sigma).abs() < limit)
        .collect()
}

fn iqr_mask(residuals: &[f64], threshold: f64, border: BorderMode) -> Vec<bool> {
    let Some((q1, q3)) = quartiles(residuals) else {
        return Vec::new();
    };
    let iqr = q3 - q1;

    let mut lower = q1 - threshold * iqr;
    let mut upper = q3 + threshold * iqr;
    if border == BorderMode::Relaxed {
        lower -= 0.1 * lower;
        upper += 0.1 * upper;
    }

    residuals.iter().map(|&v| lower < v && v < upper).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SPREAD: [f64; 7] = [1.0, -2.0, 3.5, 0.2, -0.7, 8.0, -6.0];

    #[test]
    fn std_tight_rejects_large_z_scores() {
        // z ≈ [0.11, -0.63, 0.72, -0.09, -0.31, 1.83, -1.62]
        let c = classify(&SPREAD, OutlierStrategy::StdDev, 1.5, BorderMode::Tight).unwrap();
        assert_eq!(c.mask, vec![true, true, true, true, true, false, false]);
        assert_eq!(c.values, vec![1.0, -2.0, 3.5, 0.2, -0.7]);
    }

    #[test]
    fn std_relaxed_extends_cutoff_by_ten_percent() {
        // Cutoff 1.65 readmits z = -1.62 but not z = 1.83.
        let c = classify(&SPREAD, OutlierStrategy::StdDev, 1.5, BorderMode::Relaxed).unwrap();
        assert_eq!(c.mask, vec![true, true, true, true, true, false, true]);
        assert_eq!(c.accepted_count(), 6);
    }

    #[test]
    fn std_constant_residuals_accept_everything() {
        let residuals = [0.25; 6];
        for border in [BorderMode::Tight, BorderMode::Relaxed] {
            let c = classify(&residuals, OutlierStrategy::StdDev, 0.1, border).unwrap();
            assert!(c.mask.iter().all(|&m| m));
            assert_eq!(c.values.len(), 6);
        }
    }

    #[test]
    fn std_inexact_constant_residuals_accept_everything() {
        // 0.1 is not exact in binary; the mean drifts by an ulp for some lengths.
        for n in [3, 5, 10] {
            let residuals = vec![0.1; n];
            for border in [BorderMode::Tight, BorderMode::Relaxed] {
                let c = classify(&residuals, OutlierStrategy::StdDev, 0.5, border).unwrap();
                assert_eq!(c.accepted_count(), n);
            }
        }
    }

    #[test]
    fn iqr_tight_uses_strict_fences() {
        // Q1 = -2, Q3 = 2, IQR = 4 -> fences (-4, 4) at t = 0.5.
        let values = [-4.0, -2.0, 0.0, 2.0, 4.0];
        let c = classify(&values, OutlierStrategy::Iqr, 0.5, BorderMode::Tight).unwrap();
        assert_eq!(c.mask, vec![false, true, true, true, false]);
    }

    #[test]
    fn iqr_relaxed_moves_negative_lower_fence_inwards() {
        // Tight fences (-4, 4). Relaxed: lower = -4 - 0.1 * -4 = -3.6, upper = 4.4.
        // The lower fence tightens, so -3.8 is accepted by tight and rejected by relaxed.
        let values = [-3.8, -2.0, 0.0, 2.0, 3.8];
        let tight = classify(&values, OutlierStrategy::Iqr, 0.5, BorderMode::Tight).unwrap();
        let relaxed = classify(&values, OutlierStrategy::Iqr, 0.5, BorderMode::Relaxed).unwrap();
        assert_eq!(tight.mask, vec![true, true, true, true, true]);
        assert_eq!(relaxed.mask, vec![false, true, true, true, true]);
    }

    #[test]
    fn iqr_relaxed_on_all_negative_values_narrows_both_fences() {
        // Q1 = -9, Q3 = -7 -> tight (-10, -6), relaxed (-9, -6.6).
        let values = [-10.0, -9.0, -8.0, -7.0, -6.0];
        let tight = classify(&values, OutlierStrategy::Iqr, 0.5, BorderMode::Tight).unwrap();
        let relaxed = classify(&values, OutlierStrategy::Iqr, 0.5, BorderMode::Relaxed).unwrap();
        assert_eq!(tight.mask, vec![false, true, true, true, false]);
        assert_eq!(relaxed.mask, vec![false, false, true, true, false]);
    }

    #[test]
    fn iqr_zero_spread_rejects_everything() {
        // Fences collapse onto Q1 == Q3 and both comparisons are strict.
        let c = classify(&[1.0; 5], OutlierStrategy::Iqr, 1.5, BorderMode::Tight).unwrap();
        assert_eq!(c.accepted_count(), 0);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = classify(&SPREAD, OutlierStrategy::Iqr, t, BorderMode::Tight).unwrap_err();
            assert!(matches!(err, FitError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn empty_or_non_finite_residuals_are_invalid() {
        assert!(matches!(
            classify(&[], OutlierStrategy::StdDev, 1.0, BorderMode::Tight),
            Err(FitError::InvalidInput(_))
        ));
        assert!(matches!(
            classify(&[1.0, f64::NAN], OutlierStrategy::StdDev, 1.0, BorderMode::Tight),
            Err(FitError::InvalidInput(_))
        ));
    }

    proptest! {
        #[test]
        fn std_acceptance_is_monotonic_in_threshold(
            values in prop::collection::vec(-100.0f64..100.0, 2..60),
            t1 in 0.05f64..5.0,
            dt in 0.0f64..5.0,
        ) {
            let t2 = t1 + dt;
            for border in [BorderMode::Tight, BorderMode::Relaxed] {
                let a = classify(&values, OutlierStrategy::StdDev, t1, border).unwrap();
                let b = classify(&values, OutlierStrategy::StdDev, t2, border).unwrap();
                for (lo, hi) in a.mask.iter().zip(&b.mask) {
                    prop_assert!(!*lo || *hi);
                }
            }
        }

        #[test]
        fn iqr_relaxed_keeps_tight_inliers_when_fences_are_non_negative(
            values in prop::collection::vec(10.0f64..20.0, 1..60),
            t in 0.01f64..1.0,
        ) {
            // Q1 >= 10 and IQR <= 10, so the lower fence is >= 0.
            let tight = classify(&values, OutlierStrategy::Iqr, t, BorderMode::Tight).unwrap();
            let relaxed = classify(&values, OutlierStrategy::Iqr, t, BorderMode::Relaxed).unwrap();
            prop_assert!(relaxed.accepted_count() >= tight.accepted_count());
            for (a, b) in tight.mask.iter().zip(&relaxed.mask) {
                prop_assert!(!*a || *b);
            }
        }
    }
}
