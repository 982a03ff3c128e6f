//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitReport, LinearFit, PairSeries, VariantSummary};
use crate::fit::sweep::{Sweep, best_point};

/// Maximum number of rejected observations listed individually.
const MAX_LISTED_OUTLIERS: usize = 20;

/// Format the full run summary (data + baseline + both variants + chosen fit).
pub fn format_fit_summary(series: &PairSeries, report: &FitReport) -> String {
    let mut out = String::new();
    let adaptive = &report.adaptive;

    out.push_str("=== pairfit - outlier-aware linear fit ===\n");
    out.push_str(&format!("Pair: x={} | y={}\n", series.x_label, series.y_label));
    out.push_str(&format!(
        "Window: {}\n",
        window_label(series, report.window_start, report.n_points)
    ));
    out.push_str(&format!(
        "Strategy: {} | threshold={} | curve points={}\n",
        report.params.strategy, report.params.threshold, report.params.curve_points
    ));

    out.push_str(&format!("\nBaseline:  {}\n", fmt_fit(&report.baseline)));

    out.push_str("\nBorder variants:\n");
    for v in [&adaptive.tight, &adaptive.relaxed] {
        let chosen = if v.border == adaptive.chosen { "*" } else { " " };
        out.push_str(&format!("{chosen} {}\n", fmt_variant(v, report.n_points)));
    }

    out.push_str(&format!("\nChosen ({}):\n", adaptive.chosen.display_name()));
    out.push_str(&format!("- slope     : {:.6}\n", adaptive.fit.slope));
    out.push_str(&format!("- intercept : {:.6}\n", adaptive.fit.intercept));
    out.push_str(&format!("- r²        : {:.6}\n", adaptive.fit.r_squared));
    out.push_str(&format!(
        "- accepted  : {}/{}\n",
        adaptive.accepted_count(),
        report.n_points
    ));

    let rejected = adaptive.rejected_indices();
    if !rejected.is_empty() {
        out.push_str("\nOutliers:\n");
        for &offset in rejected.iter().take(MAX_LISTED_OUTLIERS) {
            let i = report.window_start + offset;
            out.push_str(&format!(
                "  {:<12} x={:>12.6} y={:>12.6} residual={:>12.6}\n",
                point_label(series, i),
                series.x[i],
                series.y[i],
                report.residuals[offset]
            ));
        }
        if rejected.len() > MAX_LISTED_OUTLIERS {
            out.push_str(&format!("  ... and {} more\n", rejected.len() - MAX_LISTED_OUTLIERS));
        }
    }

    out
}

/// Format a threshold sweep as a table, marking the best r².
pub fn format_sweep(sweep: &Sweep) -> String {
    let mut out = String::new();
    let best_idx = best_point(sweep).map(|p| p.idx);

    out.push_str("  threshold  border      slope  intercept        r²  accepted  rejected\n");
    for p in &sweep.points {
        let mark = if Some(p.idx) == best_idx { "*" } else { " " };
        out.push_str(&format!(
            "{mark} {:>9.4}  {:<7} {:>9.5} {:>10.6} {:>9.6} {:>9} {:>9}\n",
            p.threshold,
            p.chosen.display_name(),
            p.slope,
            p.intercept,
            p.r_squared,
            p.accepted,
            p.rejected
        ));
    }
    for (threshold, reason) in &sweep.skipped {
        out.push_str(&format!("  (skipped {threshold}) {reason}\n"));
    }

    out
}

fn fmt_fit(fit: &LinearFit) -> String {
    format!(
        "slope={:.6} intercept={:.6} r²={:.6} n={}",
        fit.slope, fit.intercept, fit.r_squared, fit.n
    )
}

fn fmt_variant(v: &VariantSummary, n: usize) -> String {
    format!(
        "{:<8} {} (accepted {}/{n})",
        v.border.display_name(),
        fmt_fit(&v.fit),
        v.accepted
    )
}

fn window_label(series: &PairSeries, start: usize, n: usize) -> String {
    let end = start + n.saturating_sub(1);
    match &series.dates {
        Some(d) if end < d.len() => format!("{} .. {} ({n} obs)", d[start], d[end]),
        _ => format!("#{start} .. #{end} ({n} obs)"),
    }
}

fn point_label(series: &PairSeries, i: usize) -> String {
    series
        .dates
        .as_ref()
        .and_then(|d| d.get(i))
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("#{i}"))
}
