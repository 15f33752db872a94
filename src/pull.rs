//! The pull capability shared by every bandit type.

use rand::RngCore;

use crate::error::{BanditError, Result};

/// A tracked arm that the best-arm algorithms can pull and inspect.
///
/// Both [`Bandit`](crate::Bandit) and [`BernoulliBandit`](crate::BernoulliBandit)
/// implement this trait; the algorithms are generic over it so a pool can hold
/// either kind.
///
/// "Adjusted" values are expressed in the arm's objective direction: they are
/// negated (and the bounds swapped) when lower rewards are better, so the
/// algorithms can always maximize.
pub trait Pull {
    /// Perform one trial of the arm and record its reward.
    ///
    /// On error nothing is recorded.
    fn pull(&mut self, rng: &mut dyn RngCore) -> Result<f64>;

    /// Number of recorded pulls
    fn pull_count(&self) -> u64;

    /// Sum of all recorded raw rewards
    fn accumulated_reward(&self) -> f64;

    /// Declared lower reward bound of the wrapped arm
    fn minimum(&self) -> f64;

    /// Declared upper reward bound of the wrapped arm
    fn maximum(&self) -> f64;

    /// Label of the wrapped arm
    fn display_name(&self) -> &str;

    /// Objective direction of the wrapped arm
    fn higher_is_better(&self) -> bool;

    /// Running mean of the raw rewards.
    ///
    /// Fails with [`BanditError::Unpulled`] before the first pull.
    fn mean(&self) -> Result<f64> {
        if self.pull_count() == 0 {
            return Err(BanditError::Unpulled {
                arm: self.display_name().to_string(),
            });
        }
        Ok(self.accumulated_reward() / self.pull_count() as f64)
    }

    /// Running mean in objective direction.
    fn adjusted_mean(&self) -> Result<f64> {
        let mean = self.mean()?;
        Ok(if self.higher_is_better() { mean } else { -mean })
    }

    /// Lower reward bound in objective direction.
    fn adjusted_minimum(&self) -> f64 {
        if self.higher_is_better() {
            self.minimum()
        } else {
            -self.maximum()
        }
    }

    /// Upper reward bound in objective direction.
    fn adjusted_maximum(&self) -> f64 {
        if self.higher_is_better() {
            self.maximum()
        } else {
            -self.minimum()
        }
    }
}
