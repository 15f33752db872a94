//! The arm contract and a couple of reference arms.
//!
//! An [`Arm`] is one stochastic process under comparison: an election
//! simulator, a strategy-susceptibility trial, a benchmark. The engine only
//! ever pulls it and reads its declared reward range.

use rand::RngCore;
use rand::distr::{Bernoulli, Distribution};
use rand_distr::Normal;

use crate::error::{BanditError, Result};

/// A stochastic process that returns one bounded reward per trial.
///
/// Implementations must keep every reward within `[minimum(), maximum()]` and
/// must return the same bounds for their whole lifetime. The bounds feed the
/// confidence-bound math and are never re-derived from observed rewards.
///
/// # Examples
///
/// ```
/// use bestarm::Arm;
/// use rand::{Rng, RngCore};
///
/// struct Die;
///
/// impl Arm for Die {
///     fn perform(&mut self, rng: &mut dyn RngCore) -> f64 {
///         rng.random_range(1..=6) as f64
///     }
///     fn minimum(&self) -> f64 {
///         1.0
///     }
///     fn maximum(&self) -> f64 {
///         6.0
///     }
///     fn display_name(&self) -> &str {
///         "d6"
///     }
/// }
/// ```
pub trait Arm {
    /// Run one trial and return its reward.
    fn perform(&mut self, rng: &mut dyn RngCore) -> f64;

    /// Lowest reward this arm can return.
    fn minimum(&self) -> f64;

    /// Highest reward this arm can return.
    fn maximum(&self) -> f64;

    /// Human-readable label, used for reporting only.
    fn display_name(&self) -> &str;

    /// Whether larger rewards are better. Arms reporting a penalty (a runtime,
    /// a failure rate) return `false` and are minimized instead.
    fn higher_is_better(&self) -> bool {
        true
    }
}

impl<T: Arm + ?Sized> Arm for Box<T> {
    fn perform(&mut self, rng: &mut dyn RngCore) -> f64 {
        (**self).perform(rng)
    }

    fn minimum(&self) -> f64 {
        (**self).minimum()
    }

    fn maximum(&self) -> f64 {
        (**self).maximum()
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn higher_is_better(&self) -> bool {
        (**self).higher_is_better()
    }
}

/// A Bernoulli trial: reward 1 with probability `p`, otherwise 0.
#[derive(Clone, Debug)]
pub struct BernoulliArm {
    name: String,
    p: f64,
    distribution: Bernoulli,
    higher_is_better: bool,
}

impl BernoulliArm {
    /// Creates a Bernoulli arm with success probability `p`.
    pub fn new(name: impl Into<String>, p: f64) -> Result<Self> {
        let distribution = Bernoulli::new(p).map_err(|_| BanditError::InvalidParameter {
            message: format!("success probability must be in [0, 1], got {p}"),
        })?;

        Ok(Self {
            name: name.into(),
            p,
            distribution,
            higher_is_better: true,
        })
    }

    /// Treat successes as failures: the arm with the lowest `p` is best.
    #[must_use]
    pub fn minimized(mut self) -> Self {
        self.higher_is_better = false;
        self
    }

    /// Gets the success probability
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl Arm for BernoulliArm {
    fn perform(&mut self, rng: &mut dyn RngCore) -> f64 {
        if self.distribution.sample(rng) {
            1.0
        } else {
            0.0
        }
    }

    fn minimum(&self) -> f64 {
        0.0
    }

    fn maximum(&self) -> f64 {
        1.0
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn higher_is_better(&self) -> bool {
        self.higher_is_better
    }
}

/// A normally distributed simulator whose output is clipped to a fixed range.
///
/// Mirrors simulators with unbounded raw output (runtimes, utilities) that
/// truncate their samples so the reward stays sub-Gaussian.
#[derive(Clone, Debug)]
pub struct TruncatedNormalArm {
    name: String,
    normal: Normal<f64>,
    minimum: f64,
    maximum: f64,
    higher_is_better: bool,
}

impl TruncatedNormalArm {
    /// Creates a truncated normal arm.
    pub fn new(
        name: impl Into<String>,
        mean: f64,
        std_dev: f64,
        minimum: f64,
        maximum: f64,
    ) -> Result<Self> {
        let normal = Normal::new(mean, std_dev).map_err(|e| BanditError::InvalidParameter {
            message: format!("invalid normal distribution: {e}"),
        })?;

        if !(minimum.is_finite() && maximum.is_finite()) {
            return Err(BanditError::InvalidParameter {
                message: format!("bounds must be finite, got [{minimum}, {maximum}]"),
            });
        }

        Ok(Self {
            name: name.into(),
            normal,
            minimum,
            maximum,
            higher_is_better: true,
        })
    }

    /// Minimize this arm's reward instead of maximizing it.
    #[must_use]
    pub fn minimized(mut self) -> Self {
        self.higher_is_better = false;
        self
    }
}

impl Arm for TruncatedNormalArm {
    fn perform(&mut self, rng: &mut dyn RngCore) -> f64 {
        self.normal
            .sample(rng)
            .clamp(self.minimum, self.maximum.max(self.minimum))
    }

    fn minimum(&self) -> f64 {
        self.minimum
    }

    fn maximum(&self) -> f64 {
        self.maximum
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn higher_is_better(&self) -> bool {
        self.higher_is_better
    }
}
