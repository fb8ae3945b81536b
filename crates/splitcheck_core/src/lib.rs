//! Experiment comparison engine
//!
//! This crate compares a control group against a variant group of an A/B
//! experiment log. Given decoded rows, an assignment column and a set of
//! metrics it produces:
//! - Per-metric means, medians and percent lift
//! - A Mann-Whitney U test (normal approximation, mid-rank ties) per metric
//! - A sample ratio mismatch (SRM) check on the group sizes
//! - A structured [`AnalysisReport`] ready for serialization
//!
//! # Example
//!
//! ```ignore
//! use splitcheck_core::{AnalysisConfig, AnalysisRequest, Dataset, assemble};
//!
//! let dataset: Dataset = serde_json::from_str(&rows_json)?;
//! let request = AnalysisRequest::new("variant", "revenue")
//!     .with_secondary(["clicks", "sessions"]);
//!
//! let report = assemble(&dataset, &request, &AnalysisConfig::default())?;
//! println!("p = {}", report.primary.outcome.result().unwrap().p_value);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cache;
pub mod compare;
pub mod error;
pub mod partition;
pub mod report;
pub mod srm;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cache::{Analyzer, MetricCache};
pub use compare::{compare, percent_lift};
pub use config::{AnalysisConfig, DirectionRule, ReportPrecision};
pub use error::{AnalysisError, ConfigError, MetricError};
pub use model::{
    AnalysisReport, CellValue, Dataset, MetricOutcome, MetricReport, MetricResult, PercentLift,
    Row, SrmResult, TestMeta,
};
pub use partition::partition;
pub use report::{AnalysisRequest, assemble, evaluate_metric};
pub use srm::check_srm;
