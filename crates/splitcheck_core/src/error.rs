//! Error types for the comparison engine
//!
//! Request-level problems ([`AnalysisError`]) abort a whole analysis.
//! Per-metric problems ([`MetricError`]) are caught at the metric boundary and
//! recorded in that metric's slot of the report.

/// Invalid [`crate::config::AnalysisConfig`] values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("control label must not be empty")]
    EmptyControlLabel,

    #[error("significance level must lie strictly between 0 and 1, got {0}")]
    InvalidSignificanceLevel(f64),

    #[error("expected control ratio must lie strictly between 0 and 1, got {0}")]
    InvalidExpectedRatio(f64),

    #[error("probability threshold must lie strictly between 0 and 1, got {0}")]
    InvalidProbabilityThreshold(f64),
}

/// A single metric could not be compared
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    #[error(
        "insufficient data: control group has {control_size} values, variant group has {variant_size}"
    )]
    EmptyGroup {
        control_size: usize,
        variant_size: usize,
    },
}

/// The analysis request as a whole cannot be served
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("request does not name a primary metric")]
    MissingPrimaryMetric,

    #[error("request does not name an assignment column")]
    MissingAssignmentColumn,

    #[error("no row in column {column:?} carries a label other than {control_label:?}")]
    NoVariantLabel {
        column: String,
        control_label: String,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
