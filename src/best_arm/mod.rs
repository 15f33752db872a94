//! Best-arm identification algorithms
//!
//! Both algorithms own their pool of bandits for the duration of a run and
//! are driven by repeated calls to [`BestArmIdentification::advance`] or
//! [`BestArmIdentification::advance_for`] until they report `1.0`.

mod heap;
pub mod lil_ucb;
pub mod lucb;

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rand::RngCore;
use tracing::{debug, info};

use crate::error::{BanditError, Result};
use crate::pull::Pull;

pub use lil_ucb::LilUcb;
pub use lucb::Lucb;

/// The arm an algorithm currently considers best.
#[derive(Debug)]
pub struct BestArm<'a, B> {
    /// Position of the arm in the pool
    pub index: usize,
    /// The bandit itself
    pub bandit: &'a B,
    /// Upper confidence bound (in objective direction) that ranked it first
    pub bound: f64,
}

/// One row of an interim report.
#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    /// Position of the arm in the pool
    pub index: usize,
    /// Label of the arm
    pub name: String,
    /// Raw empirical mean
    pub mean: f64,
    /// Number of pulls so far
    pub pulls: u64,
}

/// Common driver surface of the best-arm algorithms.
///
/// `advance` and `advance_for` never leave a pull half-applied: a pull either
/// completes and is recorded, or is not started.
pub trait BestArmIdentification<B: Pull> {
    /// Runs one scheduling step: a pair of pulls for LUCB, a single pull for
    /// lil'UCB.
    fn step(&mut self) -> Result<()>;

    /// Whether the stopping rule has fired.
    fn is_converged(&self) -> bool;

    /// Advisory progress in `(0, 1]`; exactly `1.0` once converged.
    fn progress(&self) -> f64;

    /// The arm currently ranked first. Advisory until converged.
    fn best_so_far(&self) -> BestArm<'_, B>;

    /// The bandit pool, in load order.
    fn pool(&self) -> &[B];

    /// Pulls performed on the pool, warm-up and earlier runs included.
    fn total_pulls(&self) -> u64;

    /// Number of arms in the pool.
    fn num_arms(&self) -> usize {
        self.pool().len()
    }

    /// Runs up to `max_steps` steps and returns the progress afterwards.
    fn advance(&mut self, max_steps: u64) -> Result<f64> {
        if self.is_converged() {
            return Ok(1.0);
        }

        for _ in 0..max_steps {
            self.step()?;
            if self.is_converged() {
                report_convergence::<B, Self>(self);
                return Ok(1.0);
            }
        }
        Ok(self.progress())
    }

    /// Keeps stepping until `budget` of wall-clock time has elapsed.
    ///
    /// The deadline is checked between steps, so a slow arm may overrun it by
    /// at most one step.
    fn advance_for(&mut self, budget: Duration) -> Result<f64> {
        if self.is_converged() {
            return Ok(1.0);
        }

        let start = Instant::now();
        while start.elapsed() < budget {
            self.step()?;
            if self.is_converged() {
                report_convergence::<B, Self>(self);
                return Ok(1.0);
            }
        }
        Ok(self.progress())
    }

    /// All arms ordered best-first by empirical mean in objective direction.
    ///
    /// This is not the scheduling order: the algorithms rank by confidence
    /// bounds, which also account for how often each arm was pulled.
    fn standings(&self) -> Vec<Standing> {
        let mut rows: Vec<(f64, Standing)> = self
            .pool()
            .iter()
            .enumerate()
            .map(|(index, bandit)| {
                let standing = Standing {
                    index,
                    name: bandit.display_name().to_string(),
                    mean: bandit.mean().unwrap_or(f64::NAN),
                    pulls: bandit.pull_count(),
                };
                (adjusted_mean_or_worst(bandit), standing)
            })
            .collect();

        rows.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        rows.into_iter().map(|(_, standing)| standing).collect()
    }
}

fn report_convergence<B, T>(algorithm: &T)
where
    B: Pull,
    T: BestArmIdentification<B> + ?Sized,
{
    let best = algorithm.best_so_far();
    info!(
        arm = best.bandit.display_name(),
        index = best.index,
        pulls = algorithm.total_pulls(),
        "best arm identified"
    );
}

/// A failed load, holding the pool so its recorded pulls are not lost.
///
/// Pulls made during the warm-up before the failure stay recorded on the
/// returned bandits.
#[derive(Debug)]
pub struct LoadError<B> {
    /// Why the pool was refused
    pub error: BanditError,
    /// The pool, exactly as it stood when loading stopped
    pub pool: Vec<B>,
}

impl<B> LoadError<B> {
    /// Splits the error from the pool
    pub fn into_parts(self) -> (BanditError, Vec<B>) {
        (self.error, self.pool)
    }
}

impl<B> From<LoadError<B>> for BanditError {
    fn from(err: LoadError<B>) -> Self {
        err.error
    }
}

/// Checks the parameters and the pool, then warms the pool up.
pub(crate) fn prepare_pool<B: Pull>(
    pool: &mut [B],
    parameters: Result<()>,
    rng: &mut dyn RngCore,
) -> Result<()> {
    parameters?;
    validate_pool(pool)?;
    warm_up(pool, rng)?;
    Ok(())
}

/// Rejects pools the confidence math cannot handle.
pub(crate) fn validate_pool<B: Pull>(pool: &[B]) -> Result<()> {
    if pool.is_empty() {
        return Err(BanditError::NoArmsAvailable);
    }

    for bandit in pool {
        let (minimum, maximum) = (bandit.minimum(), bandit.maximum());
        // Also catches NaN bounds
        if maximum.partial_cmp(&minimum) != Some(Ordering::Greater) {
            return Err(BanditError::DegenerateRange {
                arm: bandit.display_name().to_string(),
                minimum,
                maximum,
            });
        }
    }
    Ok(())
}

/// Pulls every arm that has never been pulled, in pool order.
///
/// Returns the number of pulls made; zero when the pool is already warm.
pub(crate) fn warm_up<B: Pull>(pool: &mut [B], rng: &mut dyn RngCore) -> Result<u64> {
    let len = pool.len();
    let mut pulled = 0;

    for (index, bandit) in pool.iter_mut().enumerate() {
        if bandit.pull_count() == 0 {
            bandit.pull(rng)?;
            pulled += 1;

            if pulled % 1000 == 0 {
                debug!(index, of = len, "warm-up pulls");
            }
        }
    }

    if pulled > 0 {
        debug!(pulled, arms = len, "warm-up complete");
    }
    Ok(pulled)
}

/// Total pulls already recorded across the pool.
pub(crate) fn pool_pulls<B: Pull>(pool: &[B]) -> u64 {
    pool.iter().map(Pull::pull_count).sum()
}

/// Adjusted mean, with never-pulled arms ranked last.
pub(crate) fn adjusted_mean_or_worst<B: Pull>(bandit: &B) -> f64 {
    bandit.adjusted_mean().unwrap_or(f64::NEG_INFINITY)
}
