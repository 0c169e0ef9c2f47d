//! `bike-dash` library crate.
//!
//! The binary (`bikes`) is a thin wrapper around this library so that:
//!
//! - the aggregation engine is testable without spawning processes
//! - the text report, the exporter and the TUI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
