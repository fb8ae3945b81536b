//! Shared statistical routines
//!
//! Descriptive statistics, mid-rank assignment, the Mann-Whitney U test with
//! its normal approximation and the probability that a variant draw beats a
//! control draw. Distribution tails come from `statrs`.

use std::f64::consts::SQRT_2;

use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;

/// Mean, median and spread of one group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSummary {
    pub size: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

/// Sorted copy of `values` (ascending, total order)
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Summarize a group. Returns `None` for an empty group.
///
/// All sums run over the sorted values so the result does not depend on
/// input order. Finite inputs always give finite outputs, even near
/// `f64::MAX`.
#[must_use]
pub fn summarize(values: &[f64]) -> Option<GroupSummary> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let n = sorted.len();
    let mean = mean(&sorted);
    let median = if n % 2 == 0 {
        midpoint(sorted[n / 2 - 1], sorted[n / 2])
    } else {
        sorted[n / 2]
    };
    Some(GroupSummary {
        size: n,
        mean,
        median,
        std_dev: population_std_dev(&sorted, mean),
    })
}

fn mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        // overflowed: divide first
        values.iter().map(|v| v / n).sum()
    }
}

fn midpoint(a: f64, b: f64) -> f64 {
    let mid = (a + b) / 2.0;
    if mid.is_finite() { mid } else { a / 2.0 + b / 2.0 }
}

/// Deviations are scaled by the largest magnitude so squaring cannot overflow.
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let scale = values.iter().fold(0.0_f64, |max, v| max.max(v.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let scaled_mean = mean / scale;
    let variance = values
        .iter()
        .map(|v| {
            let d = v / scale - scaled_mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    scale * variance.sqrt()
}

/// Ranks 1..=N of `values` in their original positions.
///
/// Tied values all receive the average of the ranks they span.
#[must_use]
pub fn mid_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // sorted positions start..end cover ranks start+1 ..= end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Result of a two-sided Mann-Whitney U test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSumTest {
    /// U computed from the first sample's rank sum
    pub u_first: f64,
    /// U computed from the second sample's rank sum
    pub u_second: f64,
    /// The smaller of the two, used as the test statistic
    pub u: f64,
    pub z: f64,
    pub p_value: f64,
}

/// Two-sided Mann-Whitney U test using the normal approximation.
///
/// No continuity correction and no tie correction of the variance are
/// applied; precision is limited for small samples. When the variance term is
/// zero the z-score is taken as 0.
#[must_use]
pub fn mann_whitney_u(first: &[f64], second: &[f64]) -> RankSumTest {
    let n1 = first.len() as f64;
    let n2 = second.len() as f64;

    let combined: Vec<f64> = first.iter().chain(second).copied().collect();
    let ranks = mid_ranks(&combined);
    let (first_ranks, second_ranks) = ranks.split_at(first.len());
    let rank_sum_first: f64 = first_ranks.iter().sum();
    let rank_sum_second: f64 = second_ranks.iter().sum();

    let u_first = rank_sum_first - n1 * (n1 + 1.0) / 2.0;
    let u_second = rank_sum_second - n2 * (n2 + 1.0) / 2.0;
    let u = u_first.min(u_second);

    let mu = n1 * n2 / 2.0;
    let sigma = (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    let z = if sigma > 0.0 { (u - mu) / sigma } else { 0.0 };

    RankSumTest {
        u_first,
        u_second,
        u,
        z,
        p_value: two_sided_normal_p(z),
    }
}

/// `2 * (1 - Φ(|z|))` for the standard normal Φ
#[must_use]
pub fn two_sided_normal_p(z: f64) -> f64 {
    // 2 * (1 - Φ(x)) == erfc(x / √2), without cancellation in the tail
    erfc(z.abs() / SQRT_2).clamp(0.0, 1.0)
}

/// Standard normal CDF Φ
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    if x.is_infinite() {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }
    (0.5 * erfc(-x / SQRT_2)).clamp(0.0, 1.0)
}

/// `P(V > C)` for independent `C ~ N(control_mean, control_std²)` and
/// `V ~ N(variant_mean, variant_std²)`, i.e. `Φ((μv - μc) / √(σc² + σv²))`.
///
/// With both spreads zero the answer is 1, 0 or ½ depending on how the means
/// compare.
#[must_use]
pub fn prob_variant_better(
    control_mean: f64,
    control_std: f64,
    variant_mean: f64,
    variant_std: f64,
) -> f64 {
    let diff = variant_mean - control_mean;
    let spread = control_std.hypot(variant_std);
    if spread == 0.0 || diff.is_infinite() {
        return match diff.partial_cmp(&0.0) {
            Some(std::cmp::Ordering::Greater) => 1.0,
            Some(std::cmp::Ordering::Less) => 0.0,
            _ => 0.5,
        };
    }
    normal_cdf(diff / spread)
}

/// Upper-tail probability of the chi-squared distribution.
///
/// Returns `None` when `degrees_of_freedom` is not a valid parameter.
#[must_use]
pub fn chi_squared_sf(statistic: f64, degrees_of_freedom: f64) -> Option<f64> {
    let dist = ChiSquared::new(degrees_of_freedom).ok()?;
    if statistic <= 0.0 {
        return Some(1.0);
    }
    Some(dist.sf(statistic).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_summarize_odd_and_even() {
        let odd = summarize(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(odd.size, 3);
        assert_eq!(odd.mean, 2.0);
        assert_eq!(odd.median, 2.0);

        let even = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(even.mean, 2.5);
        assert_eq!(even.median, 2.5);

        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_summarize_std_dev() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((summary.std_dev - 2.0).abs() < EPS);
        assert_eq!(summarize(&[3.0, 3.0]).unwrap().std_dev, 0.0);
        assert_eq!(summarize(&[0.0]).unwrap().std_dev, 0.0);
    }

    #[test]
    fn test_summarize_near_f64_max_stays_finite() {
        let summary = summarize(&[f64::MAX, f64::MAX]).unwrap();
        assert_eq!(summary.mean, f64::MAX);
        assert_eq!(summary.median, f64::MAX);
        assert_eq!(summary.std_dev, 0.0);

        let summary = summarize(&[-f64::MAX, f64::MAX]).unwrap();
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.median, 0.0);
        assert!(summary.std_dev.is_finite());
        assert!((summary.std_dev / f64::MAX - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mid_ranks_average_ties() {
        // control [1,1,2] followed by variant [1,2,2]
        let ranks = mid_ranks(&[1.0, 1.0, 2.0, 1.0, 2.0, 2.0]);
        assert_eq!(ranks, vec![2.0, 2.0, 5.0, 2.0, 5.0, 5.0]);

        let ranks = mid_ranks(&[10.0, 30.0, 20.0]);
        assert_eq!(ranks, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_mann_whitney_with_ties() {
        let test = mann_whitney_u(&[1.0, 1.0, 2.0], &[1.0, 2.0, 2.0]);

        // rank sums 9 and 12
        assert_eq!(test.u_first, 3.0);
        assert_eq!(test.u_second, 6.0);
        assert_eq!(test.u, 3.0);
        assert_eq!(test.u_first + test.u_second, 9.0);

        let expected_z = (3.0 - 4.5) / (9.0_f64 * 7.0 / 12.0).sqrt();
        assert!((test.z - expected_z).abs() < EPS);
        assert!((test.p_value - 0.5127).abs() < 1e-3);
    }

    #[test]
    fn test_mann_whitney_complete_separation() {
        let low: Vec<f64> = (0..30).map(f64::from).collect();
        let high: Vec<f64> = (100..130).map(f64::from).collect();
        let test = mann_whitney_u(&low, &high);

        assert_eq!(test.u, 0.0);
        assert!(test.p_value < 1e-6);
    }

    #[test]
    fn test_mann_whitney_identical_single_values() {
        let test = mann_whitney_u(&[5.0], &[5.0]);
        assert_eq!(test.u, 0.5);
        assert!(test.z.is_finite());
        assert!(test.p_value > 0.0 && test.p_value <= 1.0);
    }

    #[test]
    fn test_two_sided_normal_p() {
        assert!((two_sided_normal_p(0.0) - 1.0).abs() < EPS);
        assert!((two_sided_normal_p(1.959964) - 0.05).abs() < 1e-6);
        assert_eq!(two_sided_normal_p(-2.5), two_sided_normal_p(2.5));
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < EPS);
        assert!((normal_cdf(1.959964) - 0.975).abs() < 1e-6);
        assert!((normal_cdf(-1.0) + normal_cdf(1.0) - 1.0).abs() < EPS);
        assert_eq!(normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(normal_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_prob_variant_better() {
        // z = 1 / sqrt(3^2 + 4^2) * 5 = 1
        let p = prob_variant_better(10.0, 3.0, 15.0, 4.0);
        assert!((p - normal_cdf(1.0)).abs() < EPS);
        let swapped = prob_variant_better(15.0, 4.0, 10.0, 3.0);
        assert!((p + swapped - 1.0).abs() < EPS);

        assert_eq!(prob_variant_better(1.0, 0.0, 2.0, 0.0), 1.0);
        assert_eq!(prob_variant_better(2.0, 0.0, 1.0, 0.0), 0.0);
        assert_eq!(prob_variant_better(1.0, 0.0, 1.0, 0.0), 0.5);
        assert_eq!(prob_variant_better(-f64::MAX, 1.0, f64::MAX, 1.0), 1.0);
    }

    #[test]
    fn test_chi_squared_sf_one_df() {
        assert_eq!(chi_squared_sf(0.0, 1.0), Some(1.0));
        // critical value for alpha = 0.05 at 1 df
        let p = chi_squared_sf(3.841459, 1.0).unwrap();
        assert!((p - 0.05).abs() < 1e-5);
        // matches the closed form erfc(sqrt(x / 2))
        let p = chi_squared_sf(4.0, 1.0).unwrap();
        assert!((p - erfc((2.0_f64).sqrt())).abs() < 1e-7);
        assert!(chi_squared_sf(1.0, -1.0).is_none());
    }
}
