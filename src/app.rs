//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads (or generates) the paired series
//! - runs the fit pipeline or a threshold sweep
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, FitArgs, SweepArgs};
use crate::data::{SyntheticConfig, generate_pair};
use crate::domain::{FitParams, PairSeries, SampleWindow};
use crate::error::AppError;
use crate::io::ingest::{IngestConfig, load_pair_csv, window_for_dates};

pub mod pipeline;

/// Entry point for the `pairfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sweep(args) => handle_sweep(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let (series, window) = load_series(&args.data)?;
    let params = fit_params_from_args(&args, window);
    let report = pipeline::fit(&series, &params)?;

    println!("{}", crate::report::format_fit_summary(&series, &report));

    if let Some(path) = &args.export_json {
        crate::io::export::write_report_json(path, &report)?;
        info!(path = %path.display(), "wrote report JSON");
    }
    if let Some(path) = &args.export_points {
        crate::io::export::write_points_csv(path, &series, &report)?;
        info!(path = %path.display(), "wrote points CSV");
    }

    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let (series, window) = load_series(&args.data)?;
    let grid = crate::fit::sweep::threshold_grid(args.min, args.max, args.steps)?;

    let base = FitParams {
        window,
        ..FitParams::new(args.strategy, args.min)
    };
    let sweep = crate::fit::sweep::sweep_thresholds(&series, &base, &grid);
    if sweep.points.is_empty() {
        return Err(AppError::new(3, "No threshold in the grid produced a valid fit."));
    }

    println!(
        "=== pairfit sweep: x={} | y={} | strategy={} ===",
        series.x_label, series.y_label, args.strategy
    );
    println!("{}", crate::report::format_sweep(&sweep));
    Ok(())
}

pub fn fit_params_from_args(args: &FitArgs, window: SampleWindow) -> FitParams {
    FitParams {
        strategy: args.strategy,
        threshold: args.threshold,
        curve_points: args.curve_points,
        window,
    }
}

/// Load the series from CSV or the synthetic generator and resolve the date window.
fn load_series(data: &DataArgs) -> Result<(PairSeries, SampleWindow), AppError> {
    let series = match &data.csv {
        Some(path) if !data.synthetic => {
            let ingest = load_pair_csv(&IngestConfig {
                csv_path: path.clone(),
                date_col: data.date_col.clone(),
                x_col: data.x_col.clone(),
                y_col: data.y_col.clone(),
                value_kind: data.values,
            })?;
            if !ingest.row_errors.is_empty() {
                eprintln!(
                    "Skipped {} of {} rows (run with -v for details).",
                    ingest.row_errors.len(),
                    ingest.rows_read
                );
            }
            ingest.series
        }
        _ => {
            let config = SyntheticConfig {
                count: data.sample_count,
                seed: data.seed,
                beta: data.beta,
                jump_prob_up: data.jump_prob,
                jump_prob_down: data.jump_prob,
                jump_k: data.jump_k,
                ..SyntheticConfig::default()
            };
            generate_pair(&config, &data.x_col, &data.y_col)?
        }
    };

    let window = match &series.dates {
        Some(dates) => window_for_dates(dates, data.from, data.to)?,
        None => SampleWindow::Full,
    };
    Ok((series, window))
}
