//! Synthetic paired return generation.
//!
//! Produces two aligned daily log-return series with a known linear relationship:
//!
//! ```text
//! x_i ~ N(0, vol_x)
//! y_i = alpha + beta * x_i + noise * (z_i + jump_i)
//! ```
//!
//! where `jump_i` is `+jump_k` with probability `jump_prob_up`, `-jump_k` with
//! probability `jump_prob_down`, otherwise 0. Jumps are the outliers the fitter
//! should find. Generation is seeded, so the same config always yields the same data.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::PairSeries;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub count: usize,
    pub seed: u64,
    pub alpha: f64,
    pub beta: f64,
    /// Daily volatility of the x series.
    pub vol_x: f64,
    /// Idiosyncratic volatility of y around the line.
    pub noise: f64,
    pub jump_prob_up: f64,
    pub jump_prob_down: f64,
    /// Jump magnitude in units of `noise`.
    pub jump_k: f64,
    pub start_date: NaiveDate,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 250,
            seed: 42,
            alpha: 0.0,
            beta: 1.2,
            vol_x: 0.012,
            noise: 0.004,
            jump_prob_up: 0.03,
            jump_prob_down: 0.03,
            jump_k: 6.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
        }
    }
}

/// Generate a synthetic pair labelled `x_label` / `y_label`.
pub fn generate_pair(config: &SyntheticConfig, x_label: &str, y_label: &str) -> Result<PairSeries, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut x = Vec::with_capacity(config.count);
    let mut y = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let xi = config.vol_x * normal.sample(&mut rng);
        let z = normal.sample(&mut rng);
        let jump = sample_jump(&mut rng, config.jump_prob_up, config.jump_prob_down, config.jump_k);
        x.push(xi);
        y.push(config.alpha + config.beta * xi + config.noise * (z + jump));
    }

    let dates = business_days(config.start_date, config.count);
    Ok(PairSeries::new(x_label, y_label, x, y).with_dates(dates))
}

fn validate(config: &SyntheticConfig) -> Result<(), AppError> {
    if config.count < 2 {
        return Err(AppError::new(2, "Synthetic sample count must be >= 2."));
    }
    if !(config.alpha.is_finite() && config.beta.is_finite()) {
        return Err(AppError::new(2, "Synthetic alpha/beta must be finite."));
    }
    if !(config.vol_x.is_finite() && config.vol_x > 0.0) {
        return Err(AppError::new(2, "Synthetic vol_x must be finite and > 0."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Synthetic noise must be finite and >= 0."));
    }
    if config.jump_prob_up < 0.0
        || config.jump_prob_down < 0.0
        || (config.jump_prob_up + config.jump_prob_down) >= 1.0
    {
        return Err(AppError::new(2, "Invalid jump probability settings."));
    }
    if !(config.jump_k.is_finite() && config.jump_k > 0.0) {
        return Err(AppError::new(2, "Invalid jump magnitude setting."));
    }
    Ok(())
}

fn sample_jump(rng: &mut StdRng, p_up: f64, p_down: f64, k: f64) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll < p_up {
        k
    } else if roll < p_up + p_down {
        -k
    } else {
        0.0
    }
}

/// `count` consecutive weekdays starting at (or after) `start`.
fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut d = start;
    while out.len() < count {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d = d + Duration::days(1);
    }
    out
}
