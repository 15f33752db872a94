use rand::RngCore;
use tracing::warn;

use crate::arm::Arm;
use crate::confidence::{bonferroni, two_sided_z};
use crate::error::{BanditError, Result};
use crate::pull::Pull;

/// An arm together with the statistics of every pull made on it
///
/// The bandit exclusively owns its arm. Its accumulated reward is always the
/// exact sum of the rewards the arm has returned, and only [`Pull::pull`]
/// mutates it.
#[derive(Clone, Debug)]
pub struct Bandit<A> {
    arm: A,
    pull_count: u64,
    accumulated_reward: f64,
}

impl<A: Arm> Bandit<A> {
    /// Creates a new bandit with no pulls recorded
    pub fn new(arm: A) -> Self {
        Self {
            arm,
            pull_count: 0,
            accumulated_reward: 0.0,
        }
    }

    /// Gets a reference to the wrapped arm
    pub fn arm(&self) -> &A {
        &self.arm
    }

    /// Consumes the bandit and returns the wrapped arm
    pub fn into_arm(self) -> A {
        self.arm
    }

    fn record(&mut self, reward: f64) {
        self.accumulated_reward += reward;
        self.pull_count += 1;
    }
}

impl<A: Arm> Pull for Bandit<A> {
    fn pull(&mut self, rng: &mut dyn RngCore) -> Result<f64> {
        let reward = self.arm.perform(rng);
        self.record(reward);
        Ok(reward)
    }

    fn pull_count(&self) -> u64 {
        self.pull_count
    }

    fn accumulated_reward(&self) -> f64 {
        self.accumulated_reward
    }

    fn minimum(&self) -> f64 {
        self.arm.minimum()
    }

    fn maximum(&self) -> f64 {
        self.arm.maximum()
    }

    fn display_name(&self) -> &str {
        self.arm.display_name()
    }

    fn higher_is_better(&self) -> bool {
        self.arm.higher_is_better()
    }
}

/// A bandit whose arm is known to return only 0 or 1
///
/// Any other reward is a contract failure: the pull returns
/// [`BanditError::NonBernoulli`] and nothing is recorded.
#[derive(Clone, Debug)]
pub struct BernoulliBandit<A> {
    inner: Bandit<A>,
    success_count: u64,
}

impl<A: Arm> BernoulliBandit<A> {
    /// Creates a new Bernoulli bandit with no pulls recorded
    pub fn new(arm: A) -> Self {
        Self {
            inner: Bandit::new(arm),
            success_count: 0,
        }
    }

    /// Number of pulls that returned 1
    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    /// Gets a reference to the wrapped arm
    pub fn arm(&self) -> &A {
        self.inner.arm()
    }

    /// Consumes the bandit and returns the wrapped arm
    pub fn into_arm(self) -> A {
        self.inner.into_arm()
    }

    /// Agresti-Coull interval for the success probability.
    ///
    /// `z` is the standard normal quantile for the wanted confidence level
    /// (1.96 for 95%). When several bandits are compared at once, pass the
    /// quantile of the Bonferroni-corrected significance, see
    /// [`bonferroni`](crate::confidence::bonferroni). The interval is clamped
    /// to `[0, 1]`.
    pub fn agresti_coull(&self, z: f64) -> Result<(f64, f64)> {
        let n = self.inner.pull_count;
        if n == 0 {
            return Err(BanditError::Unpulled {
                arm: self.display_name().to_string(),
            });
        }
        if !(z.is_finite() && z > 0.0) {
            return Err(BanditError::InvalidParameter {
                message: format!("z must be positive and finite, got {z}"),
            });
        }

        let z_sq = z * z;
        let n_adj = n as f64 + z_sq;
        let p_adj = (self.success_count as f64 + 0.5 * z_sq) / n_adj;
        let half_width = z * (p_adj * (1.0 - p_adj) / n_adj).sqrt();

        Ok((
            (p_adj - half_width).max(0.0),
            (p_adj + half_width).min(1.0),
        ))
    }

    /// Agresti-Coull interval at `significance`, Bonferroni-corrected for
    /// `comparisons` intervals reported together.
    ///
    /// `significance` may be given either way round: 0.05 and 0.95 both
    /// mean a 95% interval.
    pub fn confidence_interval(
        &self,
        significance: f64,
        comparisons: usize,
    ) -> Result<(f64, f64)> {
        let alpha = significance.min(1.0 - significance);
        let z = two_sided_z(bonferroni(alpha, comparisons))?;
        self.agresti_coull(z)
    }
}

impl<A: Arm> Pull for BernoulliBandit<A> {
    fn pull(&mut self, rng: &mut dyn RngCore) -> Result<f64> {
        let reward = self.inner.arm.perform(rng);

        if reward != 0.0 && reward != 1.0 {
            warn!(arm = self.display_name(), reward, "non-Bernoulli reward");
            return Err(BanditError::NonBernoulli {
                arm: self.display_name().to_string(),
                reward,
            });
        }

        if reward == 1.0 {
            self.success_count += 1;
        }
        self.inner.record(reward);
        Ok(reward)
    }

    fn pull_count(&self) -> u64 {
        self.inner.pull_count
    }

    fn accumulated_reward(&self) -> f64 {
        self.inner.accumulated_reward
    }

    fn minimum(&self) -> f64 {
        self.inner.minimum()
    }

    fn maximum(&self) -> f64 {
        self.inner.maximum()
    }

    fn display_name(&self) -> &str {
        self.inner.display_name()
    }

    fn higher_is_better(&self) -> bool {
        self.inner.higher_is_better()
    }
}
