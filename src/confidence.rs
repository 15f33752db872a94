//! Confidence-bound formulas used by the best-arm algorithms.
//!
//! These are plain functions of pull counts so they can be checked against
//! hand-computed values without running an algorithm.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{BanditError, Result};

/// Failure-probability split used by the lil'UCB heuristic (delta' = delta / 5).
const LIL_DELTA_DIVISOR: f64 = 5.0;
/// lil'UCB heuristic epsilon.
const LIL_EPSILON: f64 = 0.0;
/// lil'UCB heuristic beta.
const LIL_BETA: f64 = 0.5;
/// Numerator of the lil'UCB heuristic lambda (lambda = 1 + 10 / B).
const LIL_LAMBDA_NUMERATOR: f64 = 10.0;

/// LUCB1 confidence radius of an arm pulled `arm_pulls` times out of
/// `total_pulls`, in a pool of `num_arms`.
///
/// ```text
/// deltapart = 405.5 * B * N^1.1 / delta
/// C(N, n)   = sqrt( ln( deltapart * ln(deltapart) ) / (2 n) )
/// ```
///
/// The `N^1.1` factor pays for checking the bound after every round.
pub fn lucb_radius(total_pulls: u64, arm_pulls: u64, num_arms: usize, delta: f64) -> f64 {
    let deltapart = 405.5 * num_arms as f64 * (total_pulls as f64).powf(1.1) / delta;
    let logpart = (deltapart * deltapart.ln()).ln();

    (logpart / (2.0 * arm_pulls as f64)).sqrt()
}

/// Variance proxy for rewards almost surely bounded on `[minimum, maximum]`.
pub fn sigma_sq(minimum: f64, maximum: f64) -> f64 {
    let range = maximum - minimum;
    range * range / 4.0
}

/// lil'UCB confidence radius for an arm pulled `arm_pulls` times, using the
/// heuristic parameters (epsilon = 0, beta = 1/2, delta' = delta / 5).
///
/// The pool size is not part of the heuristic formula; the failure
/// probability split already accounts for it.
pub fn lil_radius(arm_pulls: u64, sigma_sq: f64, delta: f64) -> f64 {
    let n = arm_pulls as f64;
    let delta_mod = delta / LIL_DELTA_DIVISOR;

    let inner = ((1.0 + LIL_EPSILON) * n / delta_mod).ln();
    let bigstuff = 2.0 * sigma_sq * (1.0 + LIL_EPSILON) * inner.ln() / n;

    (1.0 + LIL_BETA) * (1.0 + LIL_EPSILON.sqrt()) * bigstuff.sqrt()
}

/// lil'UCB heuristic lambda for a pool of `num_arms`.
pub fn lil_lambda(num_arms: usize) -> f64 {
    1.0 + LIL_LAMBDA_NUMERATOR / num_arms as f64
}

/// lil'UCB heuristic stopping rule: the arm pulled `own_pulls` times has
/// been pulled at least `1 + lambda` times as often as all others together.
pub fn lil_should_stop(own_pulls: u64, total_pulls: u64, num_arms: usize) -> bool {
    let other = total_pulls.saturating_sub(own_pulls) as f64;
    own_pulls as f64 >= 1.0 + lil_lambda(num_arms) * other
}

/// Advisory lil'UCB progress in `(0, 1]`.
pub fn lil_progress(own_pulls: u64, total_pulls: u64, num_arms: usize) -> f64 {
    let other = total_pulls.saturating_sub(own_pulls) as f64;
    (own_pulls as f64 / (1.0 + lil_lambda(num_arms) * other)).min(1.0)
}

/// Advisory LUCB progress: `exp(-sqrt(max(gap - tolerance, 0)))`.
///
/// Monotone in the gap and exactly 1 once the gap reaches the tolerance. It
/// is a readout for humans and carries no statistical guarantee.
pub fn lucb_progress(gap: f64, tolerance: f64) -> f64 {
    (-(gap - tolerance).max(0.0).sqrt()).exp()
}

/// Per-comparison significance after a Bonferroni correction.
pub fn bonferroni(significance: f64, comparisons: usize) -> f64 {
    significance / comparisons.max(1) as f64
}

/// Standard normal quantile bounding a two-sided interval at `significance`.
///
/// Either tail convention is accepted: 0.05 and 0.95 both ask for a 95%
/// interval (z close to 1.96).
pub fn two_sided_z(significance: f64) -> Result<f64> {
    if !(significance > 0.0 && significance < 1.0) {
        return Err(BanditError::InvalidParameter {
            message: format!("significance must be in (0, 1), got {significance}"),
        });
    }
    let alpha = significance.min(1.0 - significance);

    let normal = Normal::new(0.0, 1.0).map_err(|e| BanditError::InvalidParameter {
        message: format!("standard normal: {e}"),
    })?;
    Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lucb_radius_matches_hand_computation() {
        // B = 2, N = 10, n = 5, delta = 0.01
        let deltapart: f64 = 405.5 * 2.0 * 10f64.powf(1.1) / 0.01;
        let expected = ((deltapart * deltapart.ln()).ln() / 10.0).sqrt();

        assert_abs_diff_eq!(lucb_radius(10, 5, 2, 0.01), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lucb_radius_shrinks_with_arm_pulls() {
        let few = lucb_radius(1000, 10, 4, 0.05);
        let many = lucb_radius(1000, 500, 4, 0.05);
        assert!(many < few);

        // ... and grows slowly with total pulls
        assert!(lucb_radius(100_000, 10, 4, 0.05) > few);
    }

    #[test]
    fn test_sigma_sq() {
        assert_abs_diff_eq!(sigma_sq(0.0, 1.0), 0.25);
        assert_abs_diff_eq!(sigma_sq(-1.0, 1.0), 1.0);
        assert_eq!(sigma_sq(2.0, 2.0), 0.0);
    }

    #[test]
    fn test_lil_radius_matches_hand_computation() {
        // n = 10, sigma^2 = 0.25, delta = 0.01 => delta' = 0.002
        let inner: f64 = (10.0f64 / 0.002).ln();
        let bigstuff = 2.0 * 0.25 * inner.ln() / 10.0;
        let expected = 1.5 * bigstuff.sqrt();

        assert_abs_diff_eq!(lil_radius(10, 0.25, 0.01), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lil_radius_degenerate_range_is_zero() {
        assert_eq!(lil_radius(10, 0.0, 0.01), 0.0);
    }

    #[test]
    fn test_lil_stopping_rule_boundary() {
        // B = 3, pulls 50 / 10 / 5: 50 >= 1 + (13/3) * 15 = 66 is false
        assert_abs_diff_eq!(lil_lambda(3), 1.0 + 10.0 / 3.0);
        assert!(!lil_should_stop(50, 65, 3));

        // Either side of the 66 threshold
        assert!(lil_should_stop(67, 82, 3));
        assert!(!lil_should_stop(65, 80, 3));
    }

    #[test]
    fn test_lil_single_arm_stops_immediately() {
        assert!(lil_should_stop(1, 1, 1));
        assert_eq!(lil_progress(1, 1, 1), 1.0);
    }

    #[test]
    fn test_lil_progress() {
        let progress = lil_progress(50, 65, 3);
        assert_abs_diff_eq!(progress, 50.0 / 66.0, epsilon = 1e-12);
        assert!(progress < 1.0);
    }

    #[test]
    fn test_lucb_progress() {
        assert_eq!(lucb_progress(0.005, 0.01), 1.0);
        assert_eq!(lucb_progress(0.01, 0.01), 1.0);
        assert_abs_diff_eq!(lucb_progress(1.01, 0.01), (-1.0f64).exp(), epsilon = 1e-12);
        assert!(lucb_progress(0.5, 0.01) > lucb_progress(2.0, 0.01));
    }

    #[test]
    fn test_bonferroni() {
        assert_abs_diff_eq!(bonferroni(0.05, 10), 0.005);
        assert_eq!(bonferroni(0.05, 0), 0.05);
    }

    #[test]
    fn test_two_sided_z() {
        assert_abs_diff_eq!(two_sided_z(0.05).unwrap(), 1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(two_sided_z(0.95).unwrap(), 1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(two_sided_z(0.01).unwrap(), 2.575829, epsilon = 1e-5);
        // Five comparisons at 5% each get the 1% quantile
        assert_abs_diff_eq!(
            two_sided_z(bonferroni(0.05, 5)).unwrap(),
            2.575829,
            epsilon = 1e-5
        );

        assert!(two_sided_z(0.0).is_err());
        assert!(two_sided_z(1.0).is_err());
        assert!(two_sided_z(f64::NAN).is_err());
    }
}
