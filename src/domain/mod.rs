//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`OutlierStrategy`, `BorderMode`, `SampleWindow`)
//! - the explicit run parameter object (`FitParams`)
//! - input series (`PairSeries`)
//! - fit outputs (`LinearFit`, `AdaptiveFit`, `FitReport`)

pub mod types;

pub use types::*;
