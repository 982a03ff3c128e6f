//! Outlier-aware line fitting.
//!
//! Given paired samples and residuals from a baseline fit, we:
//! - classify the residuals with the tight and the relaxed border
//! - refit OLS once on each inlier subset
//! - keep the variant with the higher r² (ties keep the tight variant)
//!
//! There is no iterative re-estimation: each variant is exactly one refit.

use tracing::debug;

use crate::domain::{AdaptiveFit, BorderMode, LinearFit, OutlierStrategy, VariantSummary};
use crate::error::FitError;
use crate::fit::outliers::{classify, validate_threshold};
use crate::math::{MIN_FIT_POINTS, fit_line, lin_space, min_max};

/// Extrapolation factor applied to the filtered x extremes when sampling the curve.
const CURVE_MARGIN: f64 = 5.0;

#[derive(Debug, Clone)]
struct Variant {
    border: BorderMode,
    mask: Vec<bool>,
    x: Vec<f64>,
    fit: LinearFit,
}

impl Variant {
    fn summary(&self) -> VariantSummary {
        VariantSummary {
            border: self.border,
            fit: self.fit,
            accepted: self.x.len(),
        }
    }
}

/// Fit a line after removing residual outliers, trying both border modes.
///
/// `residuals` must come from a prior baseline fit on the same `x`/`y`; they only
/// drive classification and are never recomputed here.
pub fn fit_adaptive_line(
    x: &[f64],
    y: &[f64],
    residuals: &[f64],
    strategy: OutlierStrategy,
    threshold: f64,
    curve_points: usize,
) -> Result<AdaptiveFit, FitError> {
    validate_inputs(x, y, residuals, curve_points)?;
    validate_threshold(threshold)?;

    let tight = fit_variant(x, y, residuals, strategy, threshold, BorderMode::Tight)?;
    let relaxed = fit_variant(x, y, residuals, strategy, threshold, BorderMode::Relaxed)?;

    debug!(
        tight_r2 = tight.fit.r_squared,
        tight_n = tight.x.len(),
        relaxed_r2 = relaxed.fit.r_squared,
        relaxed_n = relaxed.x.len(),
        "compared border variants"
    );

    let tight_summary = tight.summary();
    let relaxed_summary = relaxed.summary();

    // Deterministic selection: relaxed must be strictly better to win.
    let chosen = if tight.fit.r_squared >= relaxed.fit.r_squared {
        tight
    } else {
        relaxed
    };

    let (predicted_x, predicted_y) = sample_curve(&chosen.fit, &chosen.x, curve_points);

    Ok(AdaptiveFit {
        chosen: chosen.border,
        fit: chosen.fit,
        accepted_mask: chosen.mask,
        predicted_x,
        predicted_y,
        tight: tight_summary,
        relaxed: relaxed_summary,
    })
}

fn validate_inputs(x: &[f64], y: &[f64], residuals: &[f64], curve_points: usize) -> Result<(), FitError> {
    if x.len() != y.len() || x.len() != residuals.len() {
        return Err(FitError::InvalidInput(format!(
            "x, y and residuals must have equal length (got {}, {}, {})",
            x.len(),
            y.len(),
            residuals.len()
        )));
    }
    if x.len() < MIN_FIT_POINTS {
        return Err(FitError::InvalidInput(format!(
            "need at least {MIN_FIT_POINTS} samples, got {}",
            x.len()
        )));
    }
    if curve_points == 0 {
        return Err(FitError::InvalidInput("curve_points must be > 0".to_string()));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::InvalidInput("x and y must be finite".to_string()));
    }
    Ok(())
}

fn fit_variant(
    x: &[f64],
    y: &[f64],
    residuals: &[f64],
    strategy: OutlierStrategy,
    threshold: f64,
    border: BorderMode,
) -> Result<Variant, FitError> {
    let classification = classify(residuals, strategy, threshold, border)?;
    let mask = classification.mask;

    let (x_kept, y_kept): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .zip(&mask)
        .filter_map(|((&xi, &yi), &keep)| if keep { Some((xi, yi)) } else { None })
        .unzip();

    if x_kept.len() < MIN_FIT_POINTS {
        return Err(FitError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: x_kept.len(),
        });
    }

    let fit = fit_line(&x_kept, &y_kept)?;
    Ok(Variant {
        border,
        mask,
        x: x_kept,
        fit,
    })
}

/// Evenly spaced points over `[min - 5|min|, max + 5 max]` of the filtered x.
///
/// The range is asymmetric on purpose: the lower edge uses `|min|`, the upper edge
/// uses `max` as-is.
fn sample_curve(fit: &LinearFit, x_kept: &[f64], curve_points: usize) -> (Vec<f64>, Vec<f64>) {
    let Some((lo, hi)) = min_max(x_kept) else {
        return (Vec::new(), Vec::new());
    };
    let start = lo - lo.abs() * CURVE_MARGIN;
    let stop = hi + hi * CURVE_MARGIN;
    let xs = lin_space(start, stop, curve_points);
    let ys = fit.predict_all(&xs);
    (xs, ys)
}
