//! Error types for the bestarm library.

use thiserror::Error;

/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur during bandit operations.
///
/// Every variant is a precondition failure on the caller's side; none of them
/// is meant to be retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// No arms are available in the pool.
    #[error("no arms available")]
    NoArmsAvailable,

    /// A Bernoulli bandit's arm returned something other than 0 or 1.
    #[error("non-Bernoulli arm {arm}: reward {reward} is neither 0 nor 1")]
    NonBernoulli { arm: String, reward: f64 },

    /// A statistic was requested from a bandit that has never been pulled.
    #[error("arm {arm} has not been pulled yet")]
    Unpulled { arm: String },

    /// The arm declares an empty or inverted reward range.
    #[error("degenerate reward range for arm {arm}: [{minimum}, {maximum}]")]
    DegenerateRange {
        arm: String,
        minimum: f64,
        maximum: f64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
}
