//! Outlier-aware fitting.
//!
//! Responsibilities:
//!
//! - classify residuals as inliers/outliers (std or IQR, tight or relaxed border)
//! - refit on each inlier subset and pick the better variant
//! - sweep thresholds in parallel

pub mod adaptive;
pub mod outliers;
pub mod sweep;

pub use adaptive::*;
pub use outliers::*;
pub use sweep::*;
