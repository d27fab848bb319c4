//! Run-level configuration shared by every algorithm family.

use crate::error::ConfigError;
use crate::sampling::BoundPolicy;
use crate::termination::TerminationPolicy;
use std::time::Duration;

/// What happens when the objective fails on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationPolicy {
    /// Stop the run and return [`OptimError::Evaluation`](crate::error::OptimError::Evaluation).
    #[default]
    Abort,
    /// Assign `+inf` fitness and continue. The evaluation still counts
    /// against the budget and the individual stays in the population.
    Penalize,
}

/// Configuration of one optimization run.
///
/// # Defaults
///
/// ```
/// use u_evostrat::engine::RunConfig;
///
/// let config = RunConfig::default();
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.max_generations, Some(1000));
/// assert!(config.population_size.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evostrat::engine::{EvaluationPolicy, RunConfig};
/// use u_evostrat::sampling::BoundPolicy;
///
/// let config = RunConfig::default()
///     .with_population_size(20)
///     .with_max_evaluations(50_000)
///     .with_tolerance(1e-12)
///     .with_bound_policy(BoundPolicy::Resample { max_attempts: 10 })
///     .with_evaluation_policy(EvaluationPolicy::Penalize)
///     .with_seed(2022);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Offspring per generation `λ`. `None` uses the algorithm default.
    pub population_size: Option<usize>,

    /// Evaluation budget. `None` means unlimited.
    pub max_evaluations: Option<usize>,

    /// Generation limit. `None` means unlimited.
    pub max_generations: Option<usize>,

    /// Seed of the run's random stream.
    pub seed: u64,

    /// Stop when the fitness range of a generation falls below this value.
    pub tolerance: Option<f64>,

    /// Stop when the spread parameter (σ, c or the smallest scale) falls
    /// below this floor.
    pub min_spread: f64,

    /// Stop once the best fitness is `<=` this value.
    pub fitness_threshold: Option<f64>,

    /// Generations without sufficient improvement before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination (the default).
    pub stagnation_limit: usize,

    /// Minimum relative improvement `|old - new| / |old|` that resets the
    /// stagnation counter. 0.0 counts any strict improvement.
    pub stagnation_threshold: f64,

    /// Optional wall-clock limit in milliseconds, checked after each
    /// generation. Runs stopped this way are not reproducible.
    pub time_limit_ms: Option<u64>,

    /// Handling of candidates outside the box bounds.
    pub bound_policy: BoundPolicy,

    /// Handling of objective failures.
    pub evaluation_policy: EvaluationPolicy,

    /// Evaluate each generation's candidates in parallel (requires the
    /// `parallel` feature; ignored otherwise). Results are identical either way.
    pub parallel: bool,

    /// Keep every `record_interval`-th generation record. The final
    /// generation is always kept.
    pub record_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: None,
            max_evaluations: None,
            max_generations: Some(1000),
            seed: 42,
            tolerance: None,
            min_spread: 1e-12,
            fitness_threshold: None,
            stagnation_limit: 0,
            stagnation_threshold: 0.0,
            time_limit_ms: None,
            bound_policy: BoundPolicy::default(),
            evaluation_policy: EvaluationPolicy::default(),
            parallel: false,
            record_interval: 1,
        }
    }
}

impl RunConfig {
    /// Sets the population size `λ`.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = Some(n);
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = Some(n);
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Removes the generation limit (a budget must then be set).
    pub fn without_generation_limit(mut self) -> Self {
        self.max_generations = None;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the fitness-range tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Sets the spread floor.
    pub fn with_min_spread(mut self, floor: f64) -> Self {
        self.min_spread = floor;
        self
    }

    /// Sets the fitness threshold.
    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = Some(threshold);
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the relative improvement needed to reset the stagnation counter.
    pub fn with_stagnation_threshold(mut self, threshold: f64) -> Self {
        self.stagnation_threshold = threshold.max(0.0);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the bound policy.
    pub fn with_bound_policy(mut self, policy: BoundPolicy) -> Self {
        self.bound_policy = policy;
        self
    }

    /// Sets the evaluation failure policy.
    pub fn with_evaluation_policy(mut self, policy: EvaluationPolicy) -> Self {
        self.evaluation_policy = policy;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the record interval.
    pub fn with_record_interval(mut self, interval: usize) -> Self {
        self.record_interval = interval.max(1);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == Some(0) {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.max_evaluations == Some(0) {
            return Err(ConfigError::ZeroBudget);
        }
        if self.max_evaluations.is_none() && self.max_generations.is_none() {
            return Err(ConfigError::Unbounded);
        }
        if let Some(tol) = self.tolerance {
            if tol.is_nan() || tol < 0.0 {
                return Err(ConfigError::InvalidTolerance {
                    name: "tolerance",
                    value: tol,
                });
            }
        }
        if self.min_spread.is_nan() || self.min_spread < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                name: "min_spread",
                value: self.min_spread,
            });
        }
        if self.stagnation_threshold.is_nan() {
            return Err(ConfigError::InvalidTolerance {
                name: "stagnation_threshold",
                value: self.stagnation_threshold,
            });
        }
        Ok(())
    }

    /// Termination policy derived from this configuration.
    pub fn termination_policy(&self) -> TerminationPolicy {
        TerminationPolicy {
            max_evaluations: self.max_evaluations,
            max_generations: self.max_generations,
            fitness_threshold: self.fitness_threshold,
            tolerance: self.tolerance,
            min_spread: self.min_spread,
            stagnation_limit: self.stagnation_limit,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }
}
