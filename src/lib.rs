//! bestarm: best-arm identification for expensive stochastic simulations.
//!
//! Given a pool of arms (election simulators, strategy trials, benchmarks),
//! the algorithms in this crate decide which arm has the best expected reward
//! with probability at least `1 - delta`, while pulling as few times as they
//! can. Two algorithms are provided:
//!
//! - [`Lucb`], a fixed-budget algorithm driven by a confidence gap;
//! - [`LilUcb`], an anytime algorithm based on the law of the iterated
//!   logarithm.
//!
//! # Quick Start
//!
//! ```
//! use bestarm::prelude::*;
//!
//! // One bandit per arm
//! let pool: Vec<_> = [0.3, 0.6, 0.9]
//!     .iter()
//!     .map(|&p| BernoulliBandit::new(BernoulliArm::new(format!("p={p}"), p).unwrap()))
//!     .collect();
//!
//! let mut lil = LilUcb::load(pool, LilUcbConfig::default().with_seed(42)).unwrap();
//!
//! // Pull in batches until the stopping rule fires
//! while lil.advance(1000).unwrap() < 1.0 {}
//!
//! assert_eq!(lil.best_so_far().bandit.display_name(), "p=0.9");
//! ```

pub mod arm;
mod bandit;
pub mod best_arm;
pub mod confidence;
mod config;
mod error;
mod pull;

// Re-export main types
pub use arm::{Arm, BernoulliArm, TruncatedNormalArm};
pub use bandit::{Bandit, BernoulliBandit};
pub use best_arm::{BestArm, BestArmIdentification, LilUcb, LoadError, Lucb, Standing};
pub use config::{DEFAULT_DELTA, DEFAULT_TOLERANCE, LilUcbConfig, LucbConfig};
pub use error::{BanditError, Result};
pub use pull::Pull;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use bestarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Arm, Bandit, BanditError, BernoulliArm, BernoulliBandit, BestArmIdentification, LilUcb,
        LilUcbConfig, LoadError, Lucb, LucbConfig, Pull, Result, TruncatedNormalArm,
    };
}
