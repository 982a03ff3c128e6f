//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - compared bit-for-bit across repeated runs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Default number of points emitted along the fitted line.
pub const DEFAULT_CURVE_POINTS: usize = 100;

/// Rule used to classify residuals as inliers or outliers.
///
/// The threshold means different things per strategy and is not interchangeable:
/// a z-score cutoff for `StdDev`, a fence multiplier for `Iqr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierStrategy {
    /// Accept `|z| < threshold`.
    #[serde(rename = "std")]
    StdDev,
    /// Accept values strictly inside `[Q1 - t*IQR, Q3 + t*IQR]`.
    #[serde(rename = "iqr")]
    Iqr,
}

impl OutlierStrategy {
    pub fn token(self) -> &'static str {
        match self {
            OutlierStrategy::StdDev => "std",
            OutlierStrategy::Iqr => "iqr",
        }
    }
}

/// Parses the `std` / `iqr` tokens (case-insensitive). The CLI parses `--strategy`
/// through this, so an unknown token surfaces as `FitError::InvalidStrategy`.
impl FromStr for OutlierStrategy {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "std" => Ok(OutlierStrategy::StdDev),
            "iqr" => Ok(OutlierStrategy::Iqr),
            _ => Err(FitError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for OutlierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Whether acceptance bounds are used as computed or widened by 10% of themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderMode {
    Tight,
    Relaxed,
}

impl BorderMode {
    pub fn display_name(self) -> &'static str {
        match self {
            BorderMode::Tight => "tight",
            BorderMode::Relaxed => "relaxed",
        }
    }
}

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination on the points used for the fit.
    pub r_squared: f64,
    /// Number of points the fit was computed on.
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn predict_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }
}

/// Inclusive index range of the series to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleWindow {
    /// Every sample.
    #[default]
    Full,
    /// `start..=end`.
    Range { start: usize, end: usize },
}

impl SampleWindow {
    /// Resolve against a series of length `len` into a half-open `start..end` range.
    pub fn resolve(self, len: usize) -> Result<std::ops::Range<usize>, FitError> {
        match self {
            SampleWindow::Full => Ok(0..len),
            SampleWindow::Range { start, end } => {
                if start > end {
                    return Err(FitError::InvalidInput(format!(
                        "window start {start} is after end {end}"
                    )));
                }
                if end >= len {
                    return Err(FitError::InvalidInput(format!(
                        "window end {end} out of range for {len} samples"
                    )));
                }
                Ok(start..end + 1)
            }
        }
    }
}

/// Parameters of one fitting run.
///
/// This is passed explicitly into the pipeline; nothing is read from global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    pub strategy: OutlierStrategy,
    pub threshold: f64,
    /// Number of evenly spaced points emitted along the winning line.
    pub curve_points: usize,
    pub window: SampleWindow,
}

impl FitParams {
    pub fn new(strategy: OutlierStrategy, threshold: f64) -> Self {
        Self {
            strategy,
            threshold,
            curve_points: DEFAULT_CURVE_POINTS,
            window: SampleWindow::Full,
        }
    }
}

/// Two aligned series, optionally labelled with dates.
///
/// Dates are for reporting and window resolution only; the fitting core never sees them.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSeries {
    pub x_label: String,
    pub y_label: String,
    pub dates: Option<Vec<NaiveDate>>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PairSeries {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            dates: None,
            x,
            y,
        }
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = Some(dates);
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Outcome of one border-mode variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub border: BorderMode,
    pub fit: LinearFit,
    pub accepted: usize,
}

/// Output of the adaptive (outlier-aware) fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveFit {
    pub chosen: BorderMode,
    pub fit: LinearFit,
    pub accepted_mask: Vec<bool>,
    pub predicted_x: Vec<f64>,
    pub predicted_y: Vec<f64>,
    pub tight: VariantSummary,
    pub relaxed: VariantSummary,
}

impl AdaptiveFit {
    pub fn accepted_count(&self) -> usize {
        self.accepted_mask.iter().filter(|&&a| a).count()
    }

    pub fn rejected_indices(&self) -> Vec<usize> {
        self.accepted_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a { None } else { Some(i) })
            .collect()
    }
}

/// Full output of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub params: FitParams,
    /// Offset of the fitted window within the input series.
    pub window_start: usize,
    pub n_points: usize,
    /// Plain OLS on every point in the window.
    pub baseline: LinearFit,
    /// `y - baseline.predict(x)` for every point in the window.
    pub residuals: Vec<f64>,
    pub adaptive: AdaptiveFit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_tokens_parse_case_insensitively() {
        assert_eq!("std".parse::<OutlierStrategy>().unwrap(), OutlierStrategy::StdDev);
        assert_eq!(" IQR ".parse::<OutlierStrategy>().unwrap(), OutlierStrategy::Iqr);
    }

    #[test]
    fn unknown_strategy_token_is_rejected() {
        let err = "mad".parse::<OutlierStrategy>().unwrap_err();
        assert_eq!(err, FitError::InvalidStrategy("mad".to_string()));
    }

    #[test]
    fn window_resolves_inclusive_range() {
        assert_eq!(SampleWindow::Full.resolve(5).unwrap(), 0..5);
        assert_eq!(SampleWindow::Range { start: 1, end: 3 }.resolve(5).unwrap(), 1..4);
        assert!(SampleWindow::Range { start: 3, end: 1 }.resolve(5).is_err());
        assert!(SampleWindow::Range { start: 0, end: 5 }.resolve(5).is_err());
    }

    #[test]
    fn linear_fit_predicts_on_the_line() {
        let fit = LinearFit {
            slope: 2.0,
            intercept: -1.0,
            r_squared: 1.0,
            n: 2,
        };
        assert_eq!(fit.predict_all(&[0.0, 1.5]), vec![-1.0, 2.0]);
    }
}
