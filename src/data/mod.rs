//! Offline data sources.
//!
//! - log-return conversion of price series (`returns`)
//! - seeded synthetic pairs with jump outliers (`synthetic`)

pub mod returns;
pub mod synthetic;

pub use returns::*;
pub use synthetic::*;
