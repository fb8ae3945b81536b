//! Core data types: decoded input rows and the analysis report
//!
//! - `dataset` - Cell values, rows and the dataset wrapper
//! - `results` - Per-metric results, SRM result and the aggregate report

mod dataset;
mod results;

pub use dataset::*;
pub use results::*;
