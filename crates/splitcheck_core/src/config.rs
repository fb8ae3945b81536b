//! Analysis configuration
//!
//! A single [`AnalysisConfig`] is resolved once per deployment and applied
//! uniformly to every metric in a report. All fields have defaults so a
//! partial YAML file is enough.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default label of the control arm
pub const DEFAULT_CONTROL_LABEL: &str = "Control";

/// Default p-value cutoff for flagging a metric as significant
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default cutoff on `prob_variant_better` for `probably_better`
pub const DEFAULT_PROBABILITY_THRESHOLD: f64 = 0.95;

/// Default expected control share of assigned rows
pub const DEFAULT_EXPECTED_CONTROL_RATIO: f64 = 0.5;

/// Which summary statistic decides `variant_better`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionRule {
    #[default]
    Mean,
    Median,
}

/// Decimal places applied to report fields at the output boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPrecision {
    /// Means, medians, lift and split percentages
    pub summary_decimals: u32,
    /// P-values, z-scores and the SRM chi-squared statistic
    pub p_value_decimals: u32,
}

impl Default for ReportPrecision {
    fn default() -> Self {
        Self {
            summary_decimals: 2,
            p_value_decimals: 4,
        }
    }
}

/// Configuration for one deployment of the comparison engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Assignment value identifying the control arm (exact match)
    pub control_label: String,
    /// A metric is significant when its p-value is strictly below this
    pub significance_level: f64,
    pub direction: DirectionRule,
    /// A variant is probably better when `prob_variant_better` is strictly above this
    pub probability_threshold: f64,
    /// Expected share of assigned rows in control, used by the SRM check
    pub expected_control_ratio: f64,
    /// Column whose first non-empty value names the test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id_column: Option<String>,
    pub precision: ReportPrecision,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            control_label: DEFAULT_CONTROL_LABEL.to_string(),
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            direction: DirectionRule::Mean,
            probability_threshold: DEFAULT_PROBABILITY_THRESHOLD,
            expected_control_ratio: DEFAULT_EXPECTED_CONTROL_RATIO,
            test_id_column: None,
            precision: ReportPrecision::default(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_control_label(mut self, label: impl Into<String>) -> Self {
        self.control_label = label.into();
        self
    }

    #[must_use]
    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: DirectionRule) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_probability_threshold(mut self, threshold: f64) -> Self {
        self.probability_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_expected_control_ratio(mut self, ratio: f64) -> Self {
        self.expected_control_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_test_id_column(mut self, column: impl Into<String>) -> Self {
        self.test_id_column = Some(column.into());
        self
    }

    /// Check that every value is usable before any analysis runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_label.trim().is_empty() {
            return Err(ConfigError::EmptyControlLabel);
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ConfigError::InvalidSignificanceLevel(
                self.significance_level,
            ));
        }
        if !(self.probability_threshold > 0.0 && self.probability_threshold < 1.0) {
            return Err(ConfigError::InvalidProbabilityThreshold(
                self.probability_threshold,
            ));
        }
        if !(self.expected_control_ratio > 0.0 && self.expected_control_ratio < 1.0) {
            return Err(ConfigError::InvalidExpectedRatio(
                self.expected_control_ratio,
            ));
        }
        Ok(())
    }
}
