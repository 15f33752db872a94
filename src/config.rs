//! Run parameters for the best-arm algorithms.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{BanditError, Result};

/// Default target failure probability.
pub const DEFAULT_DELTA: f64 = 0.01;
/// Default LUCB confidence-gap tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Parameters of the fixed-budget LUCB algorithm.
///
/// # Examples
///
/// ```
/// use bestarm::LucbConfig;
///
/// let config = LucbConfig::default().with_delta(0.05).with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LucbConfig {
    /// Target failure probability, in (0, 1)
    pub delta: f64,
    /// Width of the confidence gap below which LUCB stops
    pub tolerance: f64,
    /// Seed for tie-breaking and arm randomness; `None` draws from the OS
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl Default for LucbConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
        }
    }
}

impl LucbConfig {
    /// Sets the target failure probability
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Sets the confidence-gap tolerance
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Seeds the run's random number generator
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter
    pub fn validate(&self) -> Result<()> {
        validate_delta(self.delta)?;
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(BanditError::InvalidParameter {
                message: format!(
                    "tolerance must be finite and non-negative, got {}",
                    self.tolerance
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn rng(&self) -> StdRng {
        make_rng(self.seed)
    }
}

/// Parameters of the anytime lil'UCB algorithm.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LilUcbConfig {
    /// Target failure probability, in (0, 1)
    pub delta: f64,
    /// Seed for arm randomness; `None` draws from the OS
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl Default for LilUcbConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            seed: None,
        }
    }
}

impl LilUcbConfig {
    /// Sets the target failure probability
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Seeds the run's random number generator
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter
    pub fn validate(&self) -> Result<()> {
        validate_delta(self.delta)
    }

    pub(crate) fn rng(&self) -> StdRng {
        make_rng(self.seed)
    }
}

fn validate_delta(delta: f64) -> Result<()> {
    if delta > 0.0 && delta < 1.0 {
        Ok(())
    } else {
        Err(BanditError::InvalidParameter {
            message: format!("delta must be in (0, 1), got {delta}"),
        })
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LucbConfig::default().validate().is_ok());
        assert!(LilUcbConfig::default().validate().is_ok());
        assert_eq!(LilUcbConfig::default().delta, 0.01);
    }

    #[test]
    fn test_delta_validation() {
        for delta in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            assert!(matches!(
                LucbConfig::default().with_delta(delta).validate(),
                Err(BanditError::InvalidParameter { .. })
            ));
            assert!(matches!(
                LilUcbConfig::default().with_delta(delta).validate(),
                Err(BanditError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_tolerance_validation() {
        assert!(LucbConfig::default().with_tolerance(0.0).validate().is_ok());
        assert!(
            LucbConfig::default()
                .with_tolerance(-0.1)
                .validate()
                .is_err()
        );
        assert!(
            LucbConfig::default()
                .with_tolerance(f64::INFINITY)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = LilUcbConfig::default().with_seed(42);
        let a: u64 = config.rng().random();
        let b: u64 = config.rng().random();
        assert_eq!(a, b);
    }
}
