//! `pair-fit` library crate.
//!
//! The binary (`pairfit`) is a thin wrapper around this library so that:
//!
//! - the fitting core is testable without spawning processes
//! - host applications (notebooks, dashboards, services) can call
//!   [`app::pipeline::fit`] directly and own their own interaction model

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
