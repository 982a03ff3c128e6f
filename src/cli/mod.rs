//! Command-line parsing for the outlier-aware pair fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CURVE_POINTS, OutlierStrategy};
use crate::io::ingest::ValueKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pairfit", version, about = "Outlier-aware linear fit of paired return series")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG when set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit once, print the summary, and optionally export results.
    Fit(FitArgs),
    /// Fit across a grid of thresholds and tabulate the outcomes.
    Sweep(SweepArgs),
}

/// Where the paired series comes from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV file with a date column and two value columns.
    #[arg(long, value_name = "CSV", required_unless_present = "synthetic")]
    pub csv: Option<PathBuf>,

    /// Column used as x (independent series).
    #[arg(long, default_value = "x")]
    pub x_col: String,

    /// Column used as y (dependent series).
    #[arg(long, default_value = "y")]
    pub y_col: String,

    /// Name of the date column (YYYY-MM-DD).
    #[arg(long, default_value = "date")]
    pub date_col: String,

    /// Whether the value columns hold prices or returns.
    #[arg(long, value_enum, default_value_t = ValueKind::Price)]
    pub values: ValueKind,

    /// Generate a synthetic pair instead of reading a CSV.
    #[arg(long, conflicts_with = "csv")]
    pub synthetic: bool,

    /// Number of synthetic observations.
    #[arg(short = 'n', long, default_value_t = 250)]
    pub sample_count: usize,

    /// Random seed for synthetic generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True slope of the synthetic pair.
    #[arg(long, default_value_t = 1.2)]
    pub beta: f64,

    /// Probability of a synthetic outlier on each side.
    #[arg(long, default_value_t = 0.03)]
    pub jump_prob: f64,

    /// Synthetic outlier magnitude in units of the idiosyncratic noise.
    #[arg(long, default_value_t = 6.0)]
    pub jump_k: f64,

    /// First date to include (inclusive).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date to include (inclusive).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

/// Options for a single fit.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Outlier rule.
    #[arg(short, long, value_parser = OutlierStrategy::from_str, default_value = "iqr")]
    pub strategy: OutlierStrategy,

    /// z-score cutoff (std) or fence multiplier (iqr).
    #[arg(short, long, default_value_t = 1.5)]
    pub threshold: f64,

    /// Number of points sampled along the fitted line.
    #[arg(long, default_value_t = DEFAULT_CURVE_POINTS)]
    pub curve_points: usize,

    /// Export the full report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export per-point residuals and acceptance flags to CSV.
    #[arg(long = "export-points", value_name = "CSV")]
    pub export_points: Option<PathBuf>,
}

/// Options for a threshold sweep.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Outlier rule.
    #[arg(short, long, value_parser = OutlierStrategy::from_str, default_value = "iqr")]
    pub strategy: OutlierStrategy,

    /// Smallest threshold in the grid.
    #[arg(long, default_value_t = 0.5)]
    pub min: f64,

    /// Largest threshold in the grid.
    #[arg(long, default_value_t = 3.0)]
    pub max: f64,

    /// Number of thresholds in the grid.
    #[arg(long, default_value_t = 11)]
    pub steps: usize,
}
