//! Export fit results.
//!
//! - JSON: the full `FitReport` (params, baseline, chosen variant, curve samples)
//! - CSV: one row per fitted observation with its residual and acceptance flag
//!
//! Both are meant to be easy to consume in spreadsheets, notebooks or a plotting
//! front-end.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FitReport, PairSeries};
use crate::error::AppError;

/// Write the report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(4, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Write per-point classification for the fitted window.
pub fn write_points_csv(path: &Path, series: &PairSeries, report: &FitReport) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create points CSV '{}': {e}", path.display())))?;
    write_points(&mut file, series, report)
}

fn write_points<W: Write>(out: &mut W, series: &PairSeries, report: &FitReport) -> Result<(), AppError> {
    writeln!(out, "date,{},{},residual,accepted", series.x_label, series.y_label)
        .map_err(|e| AppError::new(4, format!("Failed to write points CSV header: {e}")))?;

    for (offset, (&residual, &accepted)) in report
        .residuals
        .iter()
        .zip(&report.adaptive.accepted_mask)
        .enumerate()
    {
        let i = report.window_start + offset;
        let (Some(&x), Some(&y)) = (series.x.get(i), series.y.get(i)) else {
            return Err(AppError::new(4, "Report window does not match the series."));
        };
        let date = series
            .dates
            .as_ref()
            .and_then(|d| d.get(i))
            .map(|d| d.to_string())
            .unwrap_or_default();
        writeln!(out, "{date},{x:.10},{y:.10},{residual:.10},{accepted}")
            .map_err(|e| AppError::new(4, format!("Failed to write points CSV row: {e}")))?;
    }

    Ok(())
}
