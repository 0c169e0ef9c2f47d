//! Reporting utilities: formatted terminal output for pages and results.

pub mod format;

pub use format::*;
