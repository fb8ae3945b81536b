//! Sample ratio mismatch check
//!
//! Chi-squared goodness-of-fit of the observed control/variant sizes against
//! the expected allocation, evaluated against the chi-squared survival
//! function with one degree of freedom.

use crate::model::SrmResult;
use crate::stats::chi_squared_sf;

/// P-value below which a mismatch is reported
pub const SRM_ALPHA: f64 = 0.05;

const DEGREES_OF_FREEDOM: f64 = 1.0;

/// Check the observed split against `expected_control_ratio`.
///
/// Cells with zero expected count are skipped; with no rows at all the result
/// is `p_value = 1.0`, `detected = false`.
#[must_use]
pub fn check_srm(control_count: usize, variant_count: usize, expected_control_ratio: f64) -> SrmResult {
    let total = (control_count + variant_count) as f64;
    let expected = [
        total * expected_control_ratio,
        total * (1.0 - expected_control_ratio),
    ];
    let observed = [control_count as f64, variant_count as f64];

    let chi_squared: f64 = observed
        .iter()
        .zip(expected)
        .filter(|(_, e)| *e > 0.0)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    let p_value = if total == 0.0 {
        1.0
    } else {
        chi_squared_sf(chi_squared, DEGREES_OF_FREEDOM).unwrap_or(1.0)
    };

    SrmResult {
        control_count,
        variant_count,
        expected_control_ratio,
        chi_squared,
        p_value,
        detected: p_value < SRM_ALPHA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_split() {
        let srm = check_srm(5000, 5000, 0.5);
        assert_eq!(srm.chi_squared, 0.0);
        assert!((srm.p_value - 1.0).abs() < 1e-12);
        assert!(!srm.detected);
    }

    #[test]
    fn test_heavy_imbalance() {
        let srm = check_srm(7000, 3000, 0.5);
        assert_eq!(srm.chi_squared, 1600.0);
        assert!(srm.p_value < 1e-10);
        assert!(srm.detected);
    }

    #[test]
    fn test_borderline_split() {
        // chi2 = 4.0 -> p ~ 0.0455
        let srm = check_srm(5100, 4900, 0.5);
        assert!((srm.chi_squared - 4.0).abs() < 1e-12);
        assert!((srm.p_value - 0.0455).abs() < 1e-3);
        assert!(srm.detected);

        let srm = check_srm(505, 495, 0.5);
        assert!(!srm.detected);
    }

    #[test]
    fn test_uneven_expected_ratio() {
        let srm = check_srm(6000, 4000, 0.6);
        assert!(srm.chi_squared.abs() < 1e-9);
        assert!(!srm.detected);

        assert!(check_srm(5000, 5000, 0.6).detected);
    }

    #[test]
    fn test_no_rows() {
        let srm = check_srm(0, 0, 0.5);
        assert_eq!(srm.chi_squared, 0.0);
        assert_eq!(srm.p_value, 1.0);
        assert!(!srm.detected);
    }
}
