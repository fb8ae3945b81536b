//! Analysis output types
//!
//! Everything here is produced once per run and never mutated afterwards.
//! The types serialize directly to the JSON handed to rendering and storage
//! collaborators.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ReportPrecision;

/// Above 2^52 every f64 is already a whole number.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0;

/// Round to a fixed number of decimal places.
///
/// Non-finite values pass through, as do values too large to carry the
/// requested decimals, so a finite input always rounds to a finite output.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !(scaled.abs() < EXACT_INTEGER_LIMIT) {
        return value;
    }
    scaled.round() / factor
}

/// Mean-based percent lift of variant over control.
///
/// Infinite when the control mean is zero (see [`crate::compare::percent_lift`]).
/// Serialized as a JSON number, or as `"Infinity"` / `"-Infinity"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentLift(pub f64);

impl PercentLift {
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for PercentLift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            v if v == f64::INFINITY => write!(f, "Infinity%"),
            v if v == f64::NEG_INFINITY => write!(f, "-Infinity%"),
            v => write!(f, "{v:.2}%"),
        }
    }
}

impl Serialize for PercentLift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            v if v == f64::INFINITY => serializer.serialize_str("Infinity"),
            v if v == f64::NEG_INFINITY => serializer.serialize_str("-Infinity"),
            v => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for PercentLift {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Named(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(PercentLift(v)),
            Repr::Named(s) => match s.as_str() {
                "Infinity" => Ok(PercentLift(f64::INFINITY)),
                "-Infinity" => Ok(PercentLift(f64::NEG_INFINITY)),
                other => Err(serde::de::Error::custom(format!(
                    "invalid percent lift {other:?}"
                ))),
            },
        }
    }
}

/// Outcome of comparing one metric between control and variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub control_size: usize,
    pub variant_size: usize,
    pub control_mean: f64,
    pub variant_mean: f64,
    pub control_median: f64,
    pub variant_median: f64,
    /// Population standard deviations
    pub control_std: f64,
    pub variant_std: f64,
    pub percent_lift: PercentLift,
    /// Smaller of the two Mann-Whitney U statistics
    pub u_statistic: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub significant: bool,
    pub variant_better: bool,
    /// Probability that a normal draw for the variant beats one for control
    pub prob_variant_better: f64,
    /// `prob_variant_better` above the configured threshold
    pub probably_better: bool,
}

impl MetricResult {
    /// Copy with numeric fields rounded for output
    #[must_use]
    pub fn rounded(&self, precision: &ReportPrecision) -> Self {
        let summary = |v: f64| round_to(v, precision.summary_decimals);
        let p = |v: f64| round_to(v, precision.p_value_decimals);
        Self {
            control_mean: summary(self.control_mean),
            variant_mean: summary(self.variant_mean),
            control_median: summary(self.control_median),
            variant_median: summary(self.variant_median),
            control_std: summary(self.control_std),
            variant_std: summary(self.variant_std),
            percent_lift: PercentLift(summary(self.percent_lift.0)),
            z_score: p(self.z_score),
            p_value: p(self.p_value),
            prob_variant_better: p(self.prob_variant_better),
            ..self.clone()
        }
    }
}

/// Per-metric slot in the report: either a result or an explicit marker
/// explaining why none could be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome {
    Computed(MetricResult),
    InsufficientData {
        control_size: usize,
        variant_size: usize,
        reason: String,
    },
}

impl MetricOutcome {
    #[must_use]
    pub fn result(&self) -> Option<&MetricResult> {
        match self {
            MetricOutcome::Computed(result) => Some(result),
            MetricOutcome::InsufficientData { .. } => None,
        }
    }
}

/// One metric's entry in an [`AnalysisReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metric: String,
    /// Assigned rows dropped for this metric (missing or non-numeric value)
    pub excluded_rows: usize,
    pub outcome: MetricOutcome,
}

/// Sample ratio mismatch check on the group sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrmResult {
    pub control_count: usize,
    pub variant_count: usize,
    pub expected_control_ratio: f64,
    pub chi_squared: f64,
    pub p_value: f64,
    pub detected: bool,
}

impl SrmResult {
    #[must_use]
    pub fn rounded(&self, precision: &ReportPrecision) -> Self {
        Self {
            chi_squared: round_to(self.chi_squared, precision.p_value_decimals),
            p_value: round_to(self.p_value, precision.p_value_decimals),
            ..*self
        }
    }
}

/// Test-level metadata, independent of any single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMeta {
    pub test_name: String,
    pub control_name: String,
    pub variant_name: String,
    pub control_count: usize,
    pub variant_count: usize,
    /// Rows without any assignment value
    pub unassigned_rows: usize,
    /// Control share of assigned rows, in percent
    pub actual_split: f64,
    /// Expected control share, in percent
    pub expected_split: f64,
    pub srm: SrmResult,
}

/// The engine's complete output for one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub meta: TestMeta,
    pub primary: MetricReport,
    pub secondary: BTreeMap<String, MetricReport>,
}

impl AnalysisReport {
    /// Look up a metric's entry, primary or secondary
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&MetricReport> {
        if self.primary.metric == name {
            Some(&self.primary)
        } else {
            self.secondary.get(name)
        }
    }

    /// Iterate over every metric entry, primary first
    pub fn metrics(&self) -> impl Iterator<Item = &MetricReport> {
        std::iter::once(&self.primary).chain(self.secondary.values())
    }
}
