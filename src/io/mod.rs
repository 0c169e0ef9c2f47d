//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - per-chart CSV exports (`export`)
//! - views JSON read/write (`views`)

pub mod export;
pub mod ingest;
pub mod views;

pub use export::*;
pub use ingest::*;
pub use views::*;
