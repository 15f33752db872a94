use rand::rngs::StdRng;
use tracing::debug;

use super::heap::{IndexedHeap, Priority};
use super::{
    BestArm, BestArmIdentification, LoadError, adjusted_mean_or_worst, pool_pulls, prepare_pool,
};
use crate::config::LilUcbConfig;
use crate::confidence::{lil_progress, lil_radius, lil_should_stop, sigma_sq};
use crate::error::{BanditError, Result};
use crate::pull::Pull;

/// Anytime best-arm identification (lil'UCB, heuristic variant)
///
/// Always pulls the arm with the highest `mean + C(n)` and stops once one arm
/// has been pulled `1 + lambda` times as often as all the others together,
/// with `lambda = 1 + 10 / B`. No pull budget has to be committed up front.
///
/// The variance proxy is fixed at load from the widest adjusted reward range
/// in the pool, `(max - min)^2 / 4`.
///
/// # Examples
///
/// ```
/// use bestarm::prelude::*;
/// use std::time::Duration;
///
/// let pool: Vec<_> = [0.2, 0.5, 0.8]
///     .iter()
///     .map(|&p| Bandit::new(BernoulliArm::new(format!("p={p}"), p).unwrap()))
///     .collect();
/// let mut lil = LilUcb::load(pool, LilUcbConfig::default().with_seed(1)).unwrap();
///
/// let progress = lil.advance_for(Duration::from_millis(5)).unwrap();
/// assert!(progress > 0.0 && progress <= 1.0);
/// ```
#[derive(Debug)]
pub struct LilUcb<B> {
    pool: Vec<B>,
    delta: f64,
    sigma_sq: f64,
    heap: IndexedHeap,
    total_pulls: u64,
    last_pulled: Option<usize>,
    /// Arm whose pull count met the stopping rule
    winner: Option<usize>,
    rng: StdRng,
}

impl<B: Pull> LilUcb<B> {
    /// Takes ownership of `pool`, pulls every arm that has never been pulled,
    /// and builds the scheduling order.
    ///
    /// Loading a pool whose arms have all been pulled performs no pulls.
    pub fn load(pool: Vec<B>, config: LilUcbConfig) -> Result<Self> {
        Self::try_load(pool, config).map_err(BanditError::from)
    }

    /// Like [`load`](Self::load), but hands the pool back on failure.
    pub fn try_load(
        mut pool: Vec<B>,
        config: LilUcbConfig,
    ) -> std::result::Result<Self, LoadError<B>> {
        let mut rng = config.rng();
        if let Err(error) = prepare_pool(&mut pool, config.validate(), &mut rng) {
            return Err(LoadError { error, pool });
        }

        let (minimum, maximum) = pool.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(minimum, maximum), bandit| {
                (
                    minimum.min(bandit.adjusted_minimum()),
                    maximum.max(bandit.adjusted_maximum()),
                )
            },
        );
        let sigma_sq = sigma_sq(minimum, maximum);

        let keys = pool
            .iter()
            .map(|bandit| score(bandit, sigma_sq, config.delta))
            .collect();

        debug!(arms = pool.len(), sigma_sq, "lil'ucb loaded");

        Ok(Self {
            total_pulls: pool_pulls(&pool),
            heap: IndexedHeap::from_keys(keys),
            pool,
            delta: config.delta,
            sigma_sq,
            last_pulled: None,
            winner: None,
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

    /// Variance proxy fixed at load
    pub fn sigma_sq(&self) -> f64 {
        self.sigma_sq
    }

    /// Confidence radius of arm `index` at its current pull count
    pub fn radius(&self, index: usize) -> f64 {
        lil_radius(self.pool[index].pull_count(), self.sigma_sq, self.delta)
    }

    /// Current scheduling score of arm `index`
    pub fn score(&self, index: usize) -> f64 {
        self.heap.priority(index).score.into_inner()
    }
}

fn score<B: Pull>(bandit: &B, sigma_sq: f64, delta: f64) -> Priority {
    let pulls = bandit.pull_count();
    Priority::new(
        adjusted_mean_or_worst(bandit) + lil_radius(pulls, sigma_sq, delta),
        pulls,
    )
}

impl<B: Pull> BestArmIdentification<B> for LilUcb<B> {
    fn step(&mut self) -> Result<()> {
        if self.winner.is_some() {
            return Ok(());
        }

        let Some((arm, _)) = self.heap.peek() else {
            return Ok(());
        };

        let bandit = &mut self.pool[arm];
        bandit.pull(&mut self.rng)?;
        self.total_pulls += 1;
        self.last_pulled = Some(arm);

        let key = score(&*bandit, self.sigma_sq, self.delta);
        self.heap.update(arm, key);

        let own = key.pulls;
        if lil_should_stop(own, self.total_pulls, self.pool.len()) {
            self.winner = Some(arm);
        } else if self.total_pulls % 10_000 == 0 {
            debug!(
                arm,
                own,
                pulls = self.total_pulls,
                progress = self.progress(),
                "lil'ucb progress"
            );
        }
        Ok(())
    }

    fn is_converged(&self) -> bool {
        self.winner.is_some()
    }

    fn progress(&self) -> f64 {
        if self.is_converged() {
            return 1.0;
        }

        let arm = match self.last_pulled {
            Some(arm) => arm,
            None => self.best_so_far().index,
        };
        lil_progress(
            self.pool[arm].pull_count(),
            self.total_pulls,
            self.pool.len(),
        )
    }

    /// The arm that met the stopping rule once converged; until then the
    /// current top of the scheduling order.
    fn best_so_far(&self) -> BestArm<'_, B> {
        let (index, key) = match self.winner {
            Some(arm) => (arm, self.heap.priority(arm)),
            None => self
                .heap
                .peek()
                .unwrap_or((0, Priority::new(f64::NEG_INFINITY, 0))),
        };

        BestArm {
            index,
            bandit: &self.pool[index],
            bound: key.score.into_inner(),
        }
    }

    fn pool(&self) -> &[B] {
        &self.pool
    }

    fn total_pulls(&self) -> u64 {
        self.total_pulls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::{Arm, BernoulliArm, TruncatedNormalArm};
    use crate::bandit::Bandit;
    use approx::assert_abs_diff_eq;
    use rand::RngCore;

    fn bernoulli_pool(ps: &[f64]) -> Vec<Bandit<BernoulliArm>> {
        ps.iter()
            .enumerate()
            .map(|(i, &p)| Bandit::new(BernoulliArm::new(format!("arm{i}"), p).unwrap()))
            .collect()
    }

    #[test]
    fn test_load_computes_sigma_from_pool_bounds() {
        let pool = vec![
            Bandit::new(TruncatedNormalArm::new("a", 0.0, 1.0, -1.0, 1.0).unwrap()),
            Bandit::new(TruncatedNormalArm::new("b", 2.0, 1.0, 0.0, 3.0).unwrap()),
        ];
        let lil = LilUcb::load(pool, LilUcbConfig::default().with_seed(1)).unwrap();

        // Global range is [-1, 3]
        assert_abs_diff_eq!(lil.sigma_sq(), 4.0);
    }

    #[test]
    fn test_load_uses_adjusted_bounds() {
        let pool = vec![
            Bandit::new(
                TruncatedNormalArm::new("runtime", 1.0, 1.0, 0.0, 2.0)
                    .unwrap()
                    .minimized(),
            ),
            Bandit::new(TruncatedNormalArm::new("utility", 0.5, 1.0, 0.0, 1.0).unwrap()),
        ];
        let lil = LilUcb::load(pool, LilUcbConfig::default().with_seed(1)).unwrap();

        // Adjusted ranges are [-2, 0] and [0, 1]
        assert_abs_diff_eq!(lil.sigma_sq(), 9.0 / 4.0);
    }

    #[test]
    fn test_load_rejects_bad_input() {
        assert!(matches!(
            LilUcb::load(Vec::<Bandit<BernoulliArm>>::new(), LilUcbConfig::default()),
            Err(BanditError::NoArmsAvailable)
        ));
        assert!(matches!(
            LilUcb::load(
                bernoulli_pool(&[0.5]),
                LilUcbConfig::default().with_delta(1.5)
            ),
            Err(BanditError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_step_pulls_the_top_arm() {
        let mut lil = LilUcb::load(
            bernoulli_pool(&[0.5, 0.5, 0.5, 0.5]),
            LilUcbConfig::default().with_seed(3),
        )
        .unwrap();

        let top = lil.best_so_far().index;
        let before = lil.pool()[top].pull_count();
        lil.step().unwrap();

        assert_eq!(lil.pool()[top].pull_count(), before + 1);
        assert_eq!(lil.total_pulls(), 5);
    }

    #[test]
    fn test_heap_top_has_highest_score() {
        let mut lil = LilUcb::load(
            bernoulli_pool(&[0.1, 0.4, 0.6, 0.9]),
            LilUcbConfig::default().with_seed(8),
        )
        .unwrap();
        lil.advance(50).unwrap();
        assert!(!lil.is_converged());

        let best = lil.best_so_far();
        for index in 0..lil.num_arms() {
            assert!(lil.score(index) <= best.bound);
        }
        assert_abs_diff_eq!(
            lil.score(best.index),
            lil.pool()[best.index].adjusted_mean().unwrap() + lil.radius(best.index),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_single_arm_converges_on_first_pull() {
        let mut lil =
            LilUcb::load(bernoulli_pool(&[0.5]), LilUcbConfig::default().with_seed(2)).unwrap();

        assert_eq!(lil.advance(10).unwrap(), 1.0);
        assert_eq!(lil.total_pulls(), 2);
    }

    #[test]
    fn test_progress_without_pulls_is_advisory() {
        let lil = LilUcb::load(
            bernoulli_pool(&[0.3, 0.7]),
            LilUcbConfig::default().with_seed(4),
        )
        .unwrap();

        // One pull each: 1 / (1 + 6 * 1)
        assert_abs_diff_eq!(lil.progress(), 1.0 / 7.0, epsilon = 1e-12);
    }

    /// Always pays `value` but claims the range [0, 1].
    struct Fixed(f64, &'static str);

    impl Arm for Fixed {
        fn perform(&mut self, _rng: &mut dyn RngCore) -> f64 {
            self.0
        }

        fn minimum(&self) -> f64 {
            0.0
        }

        fn maximum(&self) -> f64 {
            1.0
        }

        fn display_name(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_deterministic_arms_converge_on_best() {
        let pool = vec![
            Bandit::new(Fixed(0.2, "low")),
            Bandit::new(Fixed(0.9, "high")),
            Bandit::new(Fixed(0.5, "mid")),
        ];
        let mut lil = LilUcb::load(pool, LilUcbConfig::default().with_seed(5)).unwrap();

        assert_eq!(lil.advance(1_000_000).unwrap(), 1.0);
        assert!(lil.is_converged());
        let best = lil.best_so_far();
        assert_eq!(best.bandit.display_name(), "high");
        assert!(lil_should_stop(
            best.bandit.pull_count(),
            lil.total_pulls(),
            lil.num_arms()
        ));
        assert_abs_diff_eq!(best.bound, lil.score(best.index));

        let standings = lil.standings();
        let names: Vec<_> = standings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"]);
    }
}
