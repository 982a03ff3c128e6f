//! Threshold sweeps.
//!
//! A sweep runs the full pipeline once per threshold on the same series. Each run
//! is independent, so they are evaluated in parallel; results are reported in grid
//! order so the output does not depend on scheduling.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::app::pipeline;
use crate::domain::{BorderMode, FitParams, PairSeries};
use crate::error::FitError;

/// One successful run within a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Position in the threshold grid.
    pub idx: usize,
    pub threshold: f64,
    pub chosen: BorderMode,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub accepted: usize,
    pub rejected: usize,
}

/// All sweep results, plus thresholds that failed and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sweep {
    pub points: Vec<SweepPoint>,
    pub skipped: Vec<(f64, String)>,
}

/// Generate `steps` linearly spaced thresholds between `min` and `max` (inclusive).
pub fn threshold_grid(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FitError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(FitError::InvalidInput(format!(
            "Invalid threshold range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(FitError::InvalidInput("Threshold steps must be >= 2.".to_string()));
    }
    Ok(crate::math::lin_space(min, max, steps))
}

/// Run the pipeline for each threshold, keeping every other parameter from `base`.
pub fn sweep_thresholds(series: &PairSeries, base: &FitParams, thresholds: &[f64]) -> Sweep {
    let outcomes: Vec<(usize, f64, Result<SweepPoint, FitError>)> = thresholds
        .par_iter()
        .enumerate()
        .map(|(idx, &threshold)| {
            let params = FitParams { threshold, ..*base };
            let outcome = pipeline::fit(series, &params).map(|report| {
                let accepted = report.adaptive.accepted_count();
                SweepPoint {
                    idx,
                    threshold,
                    chosen: report.adaptive.chosen,
                    slope: report.adaptive.fit.slope,
                    intercept: report.adaptive.fit.intercept,
                    r_squared: report.adaptive.fit.r_squared,
                    accepted,
                    rejected: report.n_points - accepted,
                }
            });
            (idx, threshold, outcome)
        })
        .collect();

    let mut points = Vec::new();
    let mut skipped = Vec::new();
    for (idx, threshold, outcome) in outcomes {
        match outcome {
            Ok(point) => points.push(point),
            Err(e) => {
                warn!(idx, threshold, error = %e, "sweep threshold skipped");
                skipped.push((threshold, e.to_string()));
            }
        }
    }
    debug!(ok = points.len(), skipped = skipped.len(), "sweep finished");

    Sweep { points, skipped }
}

/// Highest r²; ties go to the earlier grid position.
pub fn best_point(sweep: &Sweep) -> Option<&SweepPoint> {
    let (first, rest) = sweep.points.split_first()?;
    let mut best = first;
    for p in rest {
        if p.r_squared > best.r_squared || (p.r_squared == best.r_squared && p.idx < best.idx) {
            best = p;
        }
    }
    Some(best)
}
