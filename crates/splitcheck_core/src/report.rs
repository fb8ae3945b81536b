//! Report assembly
//!
//! Resolves a request into the list of metrics to compare, runs the
//! partition + comparison once per metric and the SRM check once per run,
//! and gathers everything into an [`AnalysisReport`].

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compare::compare;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisReport, Dataset, MetricOutcome, MetricReport, TestMeta, round_to};
use crate::partition::{count_groups, partition};
use crate::srm::check_srm;

/// Variant name used when no non-control label is available
pub const PLACEHOLDER_VARIANT_NAME: &str = "Variant";

/// What to compare, as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub assignment_column: String,
    pub primary_metric: Option<String>,
    #[serde(default)]
    pub secondary_metrics: Vec<String>,
    /// Overrides the test name taken from the configured test id column
    #[serde(default)]
    pub test_name: Option<String>,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(assignment_column: impl Into<String>, primary_metric: impl Into<String>) -> Self {
        Self {
            assignment_column: assignment_column.into(),
            primary_metric: Some(primary_metric.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_secondary<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Split a comma-separated metric list, trimming and dropping blanks
    #[must_use]
    pub fn parse_metric_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A validated request: the metric list plus the test-level metadata
#[derive(Debug, Clone)]
pub(crate) struct AnalysisPlan {
    /// Primary metric first, then the distinct secondaries in request order
    pub metrics: Vec<String>,
    pub meta: TestMeta,
}

impl AnalysisPlan {
    pub fn resolve(
        dataset: &Dataset,
        request: &AnalysisRequest,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;

        // the primary name is matched exactly; only secondaries are trimmed
        let primary = request
            .primary_metric
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(AnalysisError::MissingPrimaryMetric)?;

        let assignment = request.assignment_column.as_str();
        if assignment.trim().is_empty() {
            return Err(AnalysisError::MissingAssignmentColumn);
        }

        let mut metrics = vec![primary.to_string()];
        for name in request.secondary_metrics.iter().map(|s| s.trim()) {
            if !name.is_empty() && !metrics.iter().any(|m| m == name) {
                metrics.push(name.to_string());
            }
        }

        let counts = count_groups(dataset.rows(), assignment, &config.control_label);
        if counts.variant == 0 {
            return Err(AnalysisError::NoVariantLabel {
                column: assignment.to_string(),
                control_label: config.control_label.clone(),
            });
        }
        if counts.variant_labels.len() > 1 {
            tracing::warn!(
                labels = ?counts.variant_labels,
                "collapsing several non-control labels into one variant group"
            );
        }

        let srm = check_srm(counts.control, counts.variant, config.expected_control_ratio);
        if srm.detected {
            tracing::warn!(
                control = counts.control,
                variant = counts.variant,
                p_value = srm.p_value,
                "sample ratio mismatch detected"
            );
        }

        let summary = |v: f64| round_to(v, config.precision.summary_decimals);
        let actual_split = counts.control as f64 / counts.total() as f64 * 100.0;

        let meta = TestMeta {
            test_name: test_name(dataset, request, config),
            control_name: config.control_label.clone(),
            variant_name: counts
                .variant_labels
                .first()
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_VARIANT_NAME.to_string()),
            control_count: counts.control,
            variant_count: counts.variant,
            unassigned_rows: counts.unassigned,
            actual_split: summary(actual_split),
            expected_split: summary(config.expected_control_ratio * 100.0),
            srm: srm.rounded(&config.precision),
        };

        Ok(Self { metrics, meta })
    }

    /// Combine per-metric reports (any order) into the final report
    pub fn finish(self, reports: impl IntoIterator<Item = MetricReport>) -> AnalysisReport {
        let mut by_name: BTreeMap<String, MetricReport> = reports
            .into_iter()
            .map(|report| (report.metric.clone(), report))
            .collect();

        let mut names = self.metrics.into_iter();
        let primary_name = names.next().unwrap_or_default();
        let primary = by_name
            .remove(&primary_name)
            .unwrap_or_else(|| missing_report(primary_name));
        let secondary = names
            .map(|name| {
                let report = by_name
                    .remove(&name)
                    .unwrap_or_else(|| missing_report(name.clone()));
                (name, report)
            })
            .collect();

        AnalysisReport {
            meta: self.meta,
            primary,
            secondary,
        }
    }
}

fn missing_report(metric: String) -> MetricReport {
    MetricReport {
        metric,
        excluded_rows: 0,
        outcome: MetricOutcome::InsufficientData {
            control_size: 0,
            variant_size: 0,
            reason: "metric was not evaluated".to_string(),
        },
    }
}

fn test_name(dataset: &Dataset, request: &AnalysisRequest, config: &AnalysisConfig) -> String {
    if let Some(name) = &request.test_name {
        return name.clone();
    }
    config
        .test_id_column
        .as_deref()
        .and_then(|column| {
            dataset
                .rows()
                .iter()
                .filter_map(|row| row.get(column))
                .find_map(|cell| cell.as_label().map(|label| label.into_owned()))
        })
        .unwrap_or_default()
}

/// Partition and compare a single metric.
///
/// An empty group is recorded as [`MetricOutcome::InsufficientData`] rather
/// than failing the report.
#[must_use]
pub fn evaluate_metric(
    dataset: &Dataset,
    assignment_column: &str,
    metric: &str,
    config: &AnalysisConfig,
) -> MetricReport {
    let groups = partition(
        dataset.rows(),
        assignment_column,
        metric,
        &config.control_label,
    );
    tracing::debug!(
        metric,
        control = groups.control.len(),
        variant = groups.variant.len(),
        excluded = groups.excluded_rows,
        "evaluating metric"
    );

    let outcome = match compare(&groups.control, &groups.variant, config) {
        Ok(result) => MetricOutcome::Computed(result.rounded(&config.precision)),
        Err(err) => {
            tracing::warn!(metric, "{err}");
            MetricOutcome::InsufficientData {
                control_size: groups.control.len(),
                variant_size: groups.variant.len(),
                reason: err.to_string(),
            }
        }
    };

    MetricReport {
        metric: metric.to_string(),
        excluded_rows: groups.excluded_rows,
        outcome,
    }
}

/// Evaluate several metrics; in parallel when the `parallel` feature is on.
pub(crate) fn evaluate_metrics(
    dataset: &Dataset,
    assignment_column: &str,
    metrics: &[String],
    config: &AnalysisConfig,
) -> Vec<MetricReport> {
    #[cfg(feature = "parallel")]
    let iter = metrics.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = metrics.iter();

    iter.map(|metric| evaluate_metric(dataset, assignment_column, metric, config))
        .collect()
}

/// Run a complete analysis without caching.
///
/// Fails on request-level problems: invalid config, no primary metric, no
/// assignment column, or no non-control label in the data.
pub fn assemble(
    dataset: &Dataset,
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let plan = AnalysisPlan::resolve(dataset, request, config)?;
    let reports = evaluate_metrics(dataset, &request.assignment_column, &plan.metrics, config);
    Ok(plan.finish(reports))
}
