//! CSV ingest and normalization.
//!
//! This module turns a dated CSV with (at least) two numeric columns into a clean,
//! aligned `PairSeries` that is safe to fit.
//!
//! Design goals:
//! - **Strict schema** for the selected columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::log_returns;
use crate::domain::{PairSeries, SampleWindow};
use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What the value columns contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Prices; converted to daily log returns (the first row is consumed).
    Price,
    /// Already returns; used as-is.
    Return,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub csv_path: PathBuf,
    pub date_col: String,
    pub x_col: String,
    pub y_col: String,
    pub value_kind: ValueKind,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the aligned series plus row bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: PairSeries,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a dated two-column series from CSV.
pub fn load_pair_csv(config: &IngestConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.csv_path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = require_column(&header_map, &config.date_col)?;
    let x_idx = require_column(&header_map, &config.x_col)?;
    let y_idx = require_column(&header_map, &config.y_col)?;

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, x_idx, y_idx, config.value_kind) {
            Ok((date, x, y)) => {
                if let Some(prev) = dates.last() {
                    if date <= *prev {
                        row_errors.push(RowError {
                            line,
                            message: format!("Date {date} is not after previous row ({prev})."),
                        });
                        continue;
                    }
                }
                dates.push(date);
                xs.push(x);
                ys.push(y);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!(line = e.line, "{}", e.message);
    }

    let (dates, x, y) = match config.value_kind {
        ValueKind::Return => (dates, xs, ys),
        ValueKind::Price => {
            if xs.len() < 2 {
                return Err(AppError::new(3, "Fewer than 2 valid prices remain after ingest."));
            }
            let x = log_returns(&xs).map_err(|e| AppError::new(2, format!("Column `{}`: {e}", config.x_col)))?;
            let y = log_returns(&ys).map_err(|e| AppError::new(2, format!("Column `{}`: {e}", config.y_col)))?;
            (dates.split_off(1), x, y)
        }
    };

    let rows_used = x.len();
    if rows_used < 2 {
        return Err(AppError::new(
            3,
            "Fewer than 2 valid observations remain after ingest.",
        ));
    }
    debug!(rows_read, rows_used, errors = row_errors.len(), "ingested CSV");

    let series = PairSeries::new(config.x_col.clone(), config.y_col.clone(), x, y).with_dates(dates);
    Ok(IngestedData {
        series,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Inclusive date filter resolved to an index window.
///
/// Dates must be ascending (as produced by `load_pair_csv`). Either bound may be
/// open; with both open the whole series is selected.
pub fn window_for_dates(
    dates: &[NaiveDate],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<SampleWindow, AppError> {
    if from.is_none() && to.is_none() {
        return Ok(SampleWindow::Full);
    }
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(AppError::new(2, format!("--from {f} is after --to {t}.")));
        }
    }

    let inside = |d: &NaiveDate| from.is_none_or(|f| *d >= f) && to.is_none_or(|t| *d <= t);
    let start = dates.iter().position(inside);
    let end = dates.iter().rposition(inside);

    match (start, end) {
        (Some(start), Some(end)) => Ok(SampleWindow::Range { start, end }),
        _ => Err(AppError::new(3, "No observations fall inside the requested date range.")),
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    x_idx: usize,
    y_idx: usize,
    kind: ValueKind,
) -> Result<(NaiveDate, f64, f64), String> {
    let date_raw = record.get(date_idx).unwrap_or("");
    let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
        .map_err(|e| format!("Invalid date '{date_raw}': {e}"))?;
    let x = parse_value(record.get(x_idx), kind)?;
    let y = parse_value(record.get(y_idx), kind)?;
    Ok((date, x, y))
}

fn parse_value(raw: Option<&str>, kind: ValueKind) -> Result<f64, String> {
    let raw = raw.unwrap_or("");
    if raw.is_empty() {
        return Err("Missing value.".to_string());
    }
    let v: f64 = raw.parse().map_err(|_| format!("Invalid number '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value '{raw}'."));
    }
    // Log returns need strictly positive prices.
    if kind == ValueKind::Price && v <= 0.0 {
        return Err(format!("Price must be > 0, got '{raw}'."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pairfit_{}_{name}.csv", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn config(path: PathBuf, value_kind: ValueKind) -> IngestConfig {
        IngestConfig {
            csv_path: path,
            date_col: "date".to_string(),
            x_col: "QQQ".to_string(),
            y_col: "IWM".to_string(),
            value_kind,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn prices_become_log_returns_and_bad_rows_are_reported() {
        let path = write_csv(
            "prices",
            "\u{feff}Date,qqq,iwm\n\
             2024-01-02,100,50\n\
             2024-01-03,110,55\n\
             not-a-date,1,1\n\
             2024-01-04,99,\n\
             2024-01-05,121,60.5\n",
        );
        let data = load_pair_csv(&config(path.clone(), ValueKind::Price)).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 4);
        assert_eq!(data.row_errors[1].line, 5);

        let s = &data.series;
        assert_eq!(s.dates.as_deref().unwrap(), &[d("2024-01-03"), d("2024-01-05")]);
        assert!((s.x[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!((s.y[1] - (1.1f64).ln()).abs() < 1e-12);
        assert_eq!(s.x_label, "QQQ");
    }

    #[test]
    fn returns_are_used_as_is() {
        let path = write_csv(
            "returns",
            "date,qqq,iwm\n2024-01-02,0.01,0.02\n2024-01-03,-0.01,-0.015\n2024-01-03,0.5,0.5\n",
        );
        let data = load_pair_csv(&config(path.clone(), ValueKind::Return)).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(data.series.x, vec![0.01, -0.01]);
        assert_eq!(data.row_errors.len(), 1);
        assert!(data.row_errors[0].message.contains("not after"));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let path = write_csv("schema", "date,qqq\n2024-01-02,1\n");
        let err = load_pair_csv(&config(path.clone(), ValueKind::Return)).unwrap_err();
        std::fs::remove_file(path).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`IWM`"));
    }

    #[test]
    fn non_positive_prices_are_skipped_rows() {
        let path = write_csv(
            "nonpositive",
            "date,qqq,iwm
             2024-01-02,100,50
             2024-01-03,0,55
             2024-01-04,110,-1
             2024-01-05,121,60.5
",
        );
        let data = load_pair_csv(&config(path.clone(), ValueKind::Price)).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[0].message.contains("> 0"));
        assert_eq!(data.row_errors[1].line, 4);
        assert_eq!(data.series.dates.as_deref().unwrap(), &[d("2024-01-05")]);
        assert!((data.series.x[0] - (1.21f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_returns_are_valid_values() {
        let path = write_csv("zeroret", "date,qqq,iwm
2024-01-02,0,0.01
2024-01-03,-0.02,0
");
        let data = load_pair_csv(&config(path.clone(), ValueKind::Return)).unwrap();
        std::fs::remove_file(path).ok();
        assert!(data.row_errors.is_empty());
        assert_eq!(data.series.x, vec![0.0, -0.02]);
    }

    #[test]
    fn date_window_is_inclusive() {
        let dates = [d("2024-01-02"), d("2024-01-03"), d("2024-01-04"), d("2024-01-08")];
        assert_eq!(window_for_dates(&dates, None, None).unwrap(), SampleWindow::Full);
        assert_eq!(
            window_for_dates(&dates, Some(d("2024-01-03")), Some(d("2024-01-04"))).unwrap(),
            SampleWindow::Range { start: 1, end: 2 }
        );
        assert_eq!(
            window_for_dates(&dates, Some(d("2024-01-05")), None).unwrap(),
            SampleWindow::Range { start: 3, end: 3 }
        );
        assert_eq!(
            window_for_dates(&dates, Some(d("2024-01-05")), Some(d("2024-01-07")))
                .unwrap_err()
                .exit_code(),
            3
        );
        assert!(window_for_dates(&dates, Some(d("2024-01-04")), Some(d("2024-01-02"))).is_err());
    }
}
