//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`Granularity`, `Statistic`, `UnmappedPolicy`, ...)
//! - raw and relabeled observations (`RawRecord`, `Record`, `Dataset`)
//! - aggregation outputs (`GroupKey`, `AggregationResult`, `BoxSummary`)

pub mod types;

pub use types::*;
