//! Input/output helpers.
//!
//! - CSV ingest + date windows (`ingest`)
//! - report exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
