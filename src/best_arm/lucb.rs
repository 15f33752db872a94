use rand::rngs::StdRng;
use rand::{Rng, RngCore};
use tracing::debug;

use super::{
    BestArm, BestArmIdentification, LoadError, adjusted_mean_or_worst, pool_pulls, prepare_pool,
};
use crate::config::LucbConfig;
use crate::confidence::{lucb_progress, lucb_radius};
use crate::error::{BanditError, Result};
use crate::pull::Pull;

/// Upper end of the random perturbation used to break ties.
const TIE_JITTER: f64 = 1e-9;

/// Fixed-budget best-arm identification (LUCB1)
///
/// Every round pulls the empirical leader `h` and the strongest challenger
/// `l` (highest upper confidence bound other than `h`), then stops once
/// `UCB(l) - LCB(h)` falls below the configured tolerance. The caller caps
/// the work by the number of rounds passed to
/// [`advance`](BestArmIdentification::advance).
///
/// # Examples
///
/// ```
/// use bestarm::prelude::*;
///
/// let pool = vec![
///     BernoulliBandit::new(BernoulliArm::new("good", 0.9).unwrap()),
///     BernoulliBandit::new(BernoulliArm::new("bad", 0.1).unwrap()),
/// ];
/// let mut lucb = Lucb::load(pool, LucbConfig::default().with_seed(3)).unwrap();
///
/// let mut progress = 0.0;
/// while progress < 1.0 {
///     progress = lucb.advance(1000).unwrap();
/// }
/// assert_eq!(lucb.best_so_far().bandit.display_name(), "good");
/// ```
#[derive(Debug)]
pub struct Lucb<B> {
    pool: Vec<B>,
    delta: f64,
    tolerance: f64,
    total_pulls: u64,
    last_gap: Option<f64>,
    converged: bool,
    rng: StdRng,
}

impl<B: Pull> Lucb<B> {
    /// Takes ownership of `pool` and pulls every arm that has not been
    /// pulled yet.
    ///
    /// Pulls already recorded on the bandits count as legitimate data.
    pub fn load(pool: Vec<B>, config: LucbConfig) -> Result<Self> {
        Self::try_load(pool, config).map_err(BanditError::from)
    }

    /// Like [`load`](Self::load), but hands the pool back on failure.
    pub fn try_load(
        mut pool: Vec<B>,
        config: LucbConfig,
    ) -> std::result::Result<Self, LoadError<B>> {
        let mut rng = config.rng();
        if let Err(error) = prepare_pool(&mut pool, config.validate(), &mut rng) {
            return Err(LoadError { error, pool });
        }
        let total_pulls = pool_pulls(&pool);

        Ok(Self {
            converged: pool.len() == 1,
            pool,
            delta: config.delta,
            tolerance: config.tolerance,
            total_pulls,
            last_gap: None,
            rng,
        })
    }

    /// Gives the pool back, e.g. to hand it to another algorithm
    pub fn into_pool(self) -> Vec<B> {
        self.pool
    }

    /// Gets the target failure probability
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Gets the confidence-gap tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Confidence gap measured at the end of the last round, if any
    pub fn last_gap(&self) -> Option<f64> {
        self.last_gap
    }

    /// Confidence radius of arm `index` at the current pull count
    pub fn radius(&self, index: usize) -> f64 {
        lucb_radius(
            self.total_pulls,
            self.pool[index].pull_count(),
            self.pool.len(),
            self.delta,
        )
    }

    fn upper_bound(&self, index: usize) -> f64 {
        adjusted_mean_or_worst(&self.pool[index]) + self.radius(index)
    }

    fn lower_bound(&self, index: usize) -> f64 {
        adjusted_mean_or_worst(&self.pool[index]) - self.radius(index)
    }

    fn pull(&mut self, index: usize) -> Result<()> {
        self.pool[index].pull(&mut self.rng)?;
        self.total_pulls += 1;
        Ok(())
    }

    /// Gap between the best challenger's UCB and the leader's LCB, computed
    /// from the current statistics without pulling anything.
    fn current_gap(&self) -> f64 {
        let Some(leader) = argmax(self.pool.len(), None, |i| {
            adjusted_mean_or_worst(&self.pool[i])
        }) else {
            return 0.0;
        };

        match argmax(self.pool.len(), Some(leader), |i| self.upper_bound(i)) {
            Some(challenger) => self.upper_bound(challenger) - self.lower_bound(leader),
            None => 0.0,
        }
    }
}

impl<B: Pull> BestArmIdentification<B> for Lucb<B> {
    fn step(&mut self) -> Result<()> {
        if self.converged {
            return Ok(());
        }

        // h: greatest empirical mean
        let (leader, _) = argmax_jittered(
            self.pool.len(),
            None,
            |i| adjusted_mean_or_worst(&self.pool[i]),
            &mut self.rng,
        )
        .unwrap_or((0, f64::NEG_INFINITY));
        self.pull(leader)?;

        // l: greatest upper confidence bound among the rest, after h's pull
        let pool = &self.pool;
        let (total, len, delta) = (self.total_pulls, pool.len(), self.delta);
        let Some((challenger, challenger_ucb)) = argmax_jittered(
            len,
            Some(leader),
            |i| {
                adjusted_mean_or_worst(&pool[i])
                    + lucb_radius(total, pool[i].pull_count(), len, delta)
            },
            &mut self.rng,
        ) else {
            self.converged = true;
            return Ok(());
        };
        self.pull(challenger)?;

        let gap = challenger_ucb - self.lower_bound(leader);
        self.last_gap = Some(gap);

        debug!(
            leader,
            challenger,
            gap,
            tolerance = self.tolerance,
            pulls = self.total_pulls,
            "lucb round"
        );

        if gap < self.tolerance {
            self.converged = true;
        }
        Ok(())
    }

    fn is_converged(&self) -> bool {
        self.converged
    }

    fn progress(&self) -> f64 {
        if self.converged {
            return 1.0;
        }
        let gap = self.last_gap.unwrap_or_else(|| self.current_gap());
        lucb_progress(gap, self.tolerance)
    }

    fn best_so_far(&self) -> BestArm<'_, B> {
        let index = argmax(self.pool.len(), None, |i| self.upper_bound(i)).unwrap_or(0);
        BestArm {
            index,
            bandit: &self.pool[index],
            bound: self.upper_bound(index),
        }
    }

    fn pool(&self) -> &[B] {
        &self.pool
    }

    fn total_pulls(&self) -> u64 {
        self.total_pulls
    }
}

/// Index with the greatest score, skipping `skip`, and its raw score.
///
/// Every candidate gets its own perturbation in `[0, TIE_JITTER)` and the
/// perturbed values are compared, so each of several exactly tied arms is
/// equally likely to win.
fn argmax_jittered(
    len: usize,
    skip: Option<usize>,
    score: impl Fn(usize) -> f64,
    rng: &mut dyn RngCore,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;

    for index in (0..len).filter(|&i| Some(i) != skip) {
        let raw = score(index);
        let jittered = raw + rng.random::<f64>() * TIE_JITTER;
        if best.is_none_or(|(_, _, best_jittered)| jittered > best_jittered) {
            best = Some((index, raw, jittered));
        }
    }
    best.map(|(index, raw, _)| (index, raw))
}

/// Deterministic variant of [`argmax_jittered`]: the first index wins ties.
fn argmax(len: usize, skip: Option<usize>, score: impl Fn(usize) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for index in (0..len).filter(|&i| Some(i) != skip) {
        let candidate = score(index);
        if best.is_none_or(|(_, best_score)| candidate > best_score) {
            best = Some((index, candidate));
        }
    }
    best.map(|(index, _)| index)
}
