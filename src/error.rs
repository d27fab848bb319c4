//! Error types for the optimization engine.
//!
//! Two kinds of failure are surfaced to callers: an invalid configuration,
//! detected before a run starts, and a failing objective evaluation under the
//! [`EvaluationPolicy::Abort`](crate::engine::EvaluationPolicy::Abort) policy.
//! Numerical instability is not an error; it ends a run normally with
//! [`TerminationReason::NumericalInstability`](crate::termination::TerminationReason::NumericalInstability).

use thiserror::Error;

/// Construction-time configuration failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Problem dimension is zero.
    #[error("dimension must be positive")]
    ZeroDimension,

    /// Population size is zero.
    #[error("population size must be positive")]
    ZeroPopulation,

    /// Lower/upper bound vectors do not match each other or the dimension.
    #[error("bounds mismatch: lower has {lower_len} elements, upper has {upper_len}, dimension is {dimension}")]
    BoundsMismatch {
        /// Length of the lower bounds
        lower_len: usize,
        /// Length of the upper bounds
        upper_len: usize,
        /// Problem dimension
        dimension: usize,
    },

    /// A lower bound exceeds its upper bound.
    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds {
        /// Coordinate index
        index: usize,
        /// Lower bound value
        lower: f64,
        /// Upper bound value
        upper: f64,
    },

    /// A bound is NaN or infinite.
    #[error("bounds at index {index} are not finite")]
    NonFiniteBounds {
        /// Coordinate index
        index: usize,
    },

    /// A vector option contains NaN or an infinity.
    #[error("{what} has a non-finite value at index {index}")]
    NonFiniteValue {
        /// Which option was wrong
        what: &'static str,
        /// Coordinate index
        index: usize,
    },

    /// An initial spread (σ, scale component or c) is not strictly positive.
    #[error("initial spread must be positive and finite, got {value}")]
    NonPositiveSpread {
        /// The offending value
        value: f64,
    },

    /// A vector option has the wrong length.
    #[error("{what} dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which option was wrong
        what: &'static str,
        /// Problem dimension
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// The algorithm needs box bounds but the problem declares none.
    #[error("{algorithm} requires box bounds")]
    MissingBounds {
        /// Algorithm name
        algorithm: &'static str,
    },

    /// A learning rate is not positive and finite.
    #[error("learning rate `{name}` must be positive and finite, got {value}")]
    InvalidLearningRate {
        /// Option name
        name: &'static str,
        /// The offending value
        value: f64,
    },

    /// Annealing decay factor outside `(0, 1]`.
    #[error("decay rate must be in (0, 1], got {rate}")]
    InvalidDecay {
        /// The offending value
        rate: f64,
    },

    /// Annealing floor is non-positive or above the initial spread.
    #[error("spread floor ({floor}) must be positive and not exceed the initial spread ({initial})")]
    InvalidFloor {
        /// Configured floor
        floor: f64,
        /// Configured initial spread
        initial: f64,
    },

    /// Number of parents is zero or exceeds the population.
    #[error("parents ({parents}) must be in 1..={population}")]
    InvalidParents {
        /// Configured number of parents
        parents: usize,
        /// Population size
        population: usize,
    },

    /// Evaluation budget of zero.
    #[error("max_evaluations must be positive")]
    ZeroBudget,

    /// Neither an evaluation budget nor a generation limit was configured.
    #[error("a run needs max_evaluations or max_generations")]
    Unbounded,

    /// A tolerance-like option is negative or NaN.
    #[error("`{name}` must be non-negative, got {value}")]
    InvalidTolerance {
        /// Option name
        name: &'static str,
        /// The offending value
        value: f64,
    },
}

impl ConfigError {
    /// Returns `true` for bounds-related failures.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            ConfigError::BoundsMismatch { .. }
                | ConfigError::InvalidBounds { .. }
                | ConfigError::NonFiniteBounds { .. }
                | ConfigError::MissingBounds { .. }
        )
    }

    /// Returns `true` for vector-length mismatches.
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ZeroDimension
                | ConfigError::DimensionMismatch { .. }
                | ConfigError::BoundsMismatch { .. }
        )
    }
}

/// Failure reported by an objective function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ObjectiveError {
    /// Human-readable cause.
    pub message: String,
}

impl ObjectiveError {
    /// Creates an objective error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by the optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimError {
    /// Invalid configuration; the run never started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The objective failed and the evaluation policy is `Abort`.
    #[error("objective failed at evaluation {evaluation}: {message}")]
    Evaluation {
        /// 1-based index of the failing evaluation within the run
        evaluation: usize,
        /// Message from the objective
        message: String,
    },
}

impl OptimError {
    /// Returns `true` if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, OptimError::Config(_))
    }

    /// Returns `true` if this is an objective evaluation error.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, OptimError::Evaluation { .. })
    }
}

/// A specialized `Result` type for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidBounds {
            index: 2,
            lower: 1.0,
            upper: -1.0,
        };
        assert_eq!(err.to_string(), "invalid bounds at index 2: lower (1) > upper (-1)");

        let err: OptimError = ConfigError::ZeroDimension.into();
        assert_eq!(err.to_string(), "invalid configuration: dimension must be positive");
    }

    #[test]
    fn test_categories() {
        let bounds = ConfigError::BoundsMismatch {
            lower_len: 1,
            upper_len: 2,
            dimension: 2,
        };
        assert!(bounds.is_bounds_error());
        assert!(bounds.is_dimension_error());
        assert!(!ConfigError::ZeroPopulation.is_bounds_error());

        let eval = OptimError::Evaluation {
            evaluation: 3,
            message: "boom".into(),
        };
        assert!(eval.is_evaluation_error());
        assert!(!eval.is_config_error());
        assert!(OptimError::from(ConfigError::ZeroBudget).is_config_error());
    }
}
