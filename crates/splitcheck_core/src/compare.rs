//! Control vs. variant comparison of a single metric

use crate::config::{AnalysisConfig, DirectionRule};
use crate::error::MetricError;
use crate::model::{MetricResult, PercentLift};
use crate::stats::{mann_whitney_u, prob_variant_better, summarize};

/// Percent change of the variant mean over the control mean.
///
/// A zero control mean gives an infinite lift signed like the variant mean,
/// or zero when both means are zero.
#[must_use]
pub fn percent_lift(control_mean: f64, variant_mean: f64) -> f64 {
    if control_mean == 0.0 {
        if variant_mean > 0.0 {
            f64::INFINITY
        } else if variant_mean < 0.0 {
            f64::NEG_INFINITY
        } else {
            0.0
        }
    } else {
        (variant_mean - control_mean) / control_mean * 100.0
    }
}

/// Compare one metric's control and variant groups.
///
/// Values are expected to be finite (the partitioner guarantees this). The
/// result is independent of the order of values within each group. Fails with
/// [`MetricError::EmptyGroup`] if either group has no values.
pub fn compare(
    control: &[f64],
    variant: &[f64],
    config: &AnalysisConfig,
) -> Result<MetricResult, MetricError> {
    let (Some(control_stats), Some(variant_stats)) = (summarize(control), summarize(variant))
    else {
        return Err(MetricError::EmptyGroup {
            control_size: control.len(),
            variant_size: variant.len(),
        });
    };

    let test = mann_whitney_u(control, variant);
    let prob_better = prob_variant_better(
        control_stats.mean,
        control_stats.std_dev,
        variant_stats.mean,
        variant_stats.std_dev,
    );

    let variant_better = match config.direction {
        DirectionRule::Mean => variant_stats.mean > control_stats.mean,
        DirectionRule::Median => variant_stats.median > control_stats.median,
    };

    Ok(MetricResult {
        control_size: control_stats.size,
        variant_size: variant_stats.size,
        control_mean: control_stats.mean,
        variant_mean: variant_stats.mean,
        control_median: control_stats.median,
        variant_median: variant_stats.median,
        control_std: control_stats.std_dev,
        variant_std: variant_stats.std_dev,
        percent_lift: PercentLift(percent_lift(control_stats.mean, variant_stats.mean)),
        u_statistic: test.u,
        z_score: test.z,
        p_value: test.p_value,
        significant: test.p_value < config.significance_level,
        variant_better,
        prob_variant_better: prob_better,
        probably_better: prob_better > config.probability_threshold,
    })
}
