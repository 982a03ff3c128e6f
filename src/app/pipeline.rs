//! Shared "fit pipeline" logic used by the `fit` and `sweep` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! window -> baseline OLS -> residuals -> adaptive refit
//!
//! The pipeline is a plain synchronous function of its inputs. Front-ends call it
//! whenever their inputs change; there is no retained state between calls.

use tracing::{debug, info};

use crate::domain::{FitParams, FitReport, PairSeries};
use crate::error::FitError;
use crate::fit::fit_adaptive_line;
use crate::math::{fit_line, residuals};

/// Fit `series` with outlier removal according to `params`.
pub fn fit(series: &PairSeries, params: &FitParams) -> Result<FitReport, FitError> {
    if series.x.len() != series.y.len() {
        return Err(FitError::InvalidInput(format!(
            "series lengths differ ({} vs {})",
            series.x.len(),
            series.y.len()
        )));
    }
    if series.is_empty() {
        return Err(FitError::InvalidInput("series is empty".to_string()));
    }

    // 1) Select the window.
    let range = params.window.resolve(series.len())?;
    let window_start = range.start;
    let x = &series.x[range.clone()];
    let y = &series.y[range];

    // 2) Baseline fit on every point in the window.
    let baseline = fit_line(x, y)?;
    debug!(
        n = baseline.n,
        slope = baseline.slope,
        intercept = baseline.intercept,
        r2 = baseline.r_squared,
        "baseline fit"
    );

    // 3) Residuals drive the outlier classification.
    let residuals = residuals(&baseline, x, y);

    // 4) Refit without outliers, trying both border modes.
    let adaptive = fit_adaptive_line(
        x,
        y,
        &residuals,
        params.strategy,
        params.threshold,
        params.curve_points,
    )?;
    info!(
        strategy = %params.strategy,
        threshold = params.threshold,
        border = adaptive.chosen.display_name(),
        accepted = adaptive.accepted_count(),
        n = x.len(),
        r2 = adaptive.fit.r_squared,
        "adaptive fit"
    );

    Ok(FitReport {
        params: *params,
        window_start,
        n_points: x.len(),
        baseline,
        residuals,
        adaptive,
    })
}
