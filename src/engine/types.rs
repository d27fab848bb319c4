//! The contract between the generation loop and an algorithm family.
//!
//! An algorithm is a [`Strategy`]: a sampler (how candidates are drawn from
//! the current distribution) paired with a distribution updater (how the
//! ranked population moves the distribution). The engine owns everything
//! else: evaluation, budget, ranking, recording and termination.

use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;
use std::fmt;

/// Parameters of a sampling distribution.
pub trait DistributionState: Clone + fmt::Debug + Send + Sync {
    /// Center of the distribution; always of problem dimension.
    fn mean(&self) -> &[f64];

    /// Smallest spread parameter, or `None` for spread-free algorithms.
    fn spread(&self) -> Option<f64>;
}

/// Raised by an updater whose result would be non-finite or degenerate.
///
/// The engine keeps the previous distribution and ends the run with
/// [`TerminationReason::NumericalInstability`](crate::termination::TerminationReason::NumericalInstability).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericalInstability {
    /// The parameter that degenerated.
    pub parameter: &'static str,
}

impl fmt::Display for NumericalInstability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} became non-finite or degenerate", self.parameter)
    }
}

/// An algorithm family: sampler plus distribution updater.
pub trait Strategy: Send + Sync {
    /// Distribution parameters carried between generations.
    type State: DistributionState;

    /// Short algorithm name for logs and results.
    fn name(&self) -> &'static str;

    /// Population size used when the run configuration leaves it unset.
    fn default_population_size(&self, dimension: usize) -> usize;

    /// Checks the algorithm options against the problem.
    fn validate(
        &self,
        dimension: usize,
        population_size: usize,
        bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError>;

    /// Rank-to-weight mapping for a configured population size.
    fn utility(&self, population_size: usize) -> Utility;

    /// Initial distribution.
    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> Self::State;

    /// Draws exactly `lambda` candidates.
    fn sample(
        &self,
        state: &Self::State,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual>;

    /// Moves the distribution given the evaluated, ranked population.
    ///
    /// On error `state` must be left unchanged.
    fn update(
        &self,
        state: &mut Self::State,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability>;
}

/// Starting point: the configured mean, else a uniform draw from the box,
/// else the origin.
pub(crate) fn initial_point(
    configured: Option<&[f64]>,
    dimension: usize,
    sampler: &Sampler,
    ctx: &mut RunContext,
) -> Vec<f64> {
    match configured {
        Some(mean) => mean.to_vec(),
        None => sampler
            .uniform(ctx, 0)
            .map_or_else(|| vec![0.0; dimension], |ind| ind.x),
    }
}

/// Checks an optional vector option: problem dimension, finite entries.
pub(crate) fn check_dimension(
    what: &'static str,
    values: Option<&[f64]>,
    dimension: usize,
) -> Result<(), ConfigError> {
    let Some(v) = values else {
        return Ok(());
    };
    if v.len() != dimension {
        return Err(ConfigError::DimensionMismatch {
            what,
            expected: dimension,
            got: v.len(),
        });
    }
    match v.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(ConfigError::NonFiniteValue { what, index }),
        None => Ok(()),
    }
}

/// Checks that a spread value is strictly positive and finite.
pub(crate) fn check_spread(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveSpread { value })
    }
}

/// Checks an optional learning-rate override.
pub(crate) fn check_learning_rate(name: &'static str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ConfigError::InvalidLearningRate { name, value: v }),
        _ => Ok(()),
    }
}

/// `4 + ⌊3 ln n⌋`, the standard offspring count for ES/NES.
pub(crate) fn default_lambda(dimension: usize) -> usize {
    4 + (3.0 * (dimension.max(1) as f64).ln()).floor() as usize
}

/// Returns an error naming `parameter` unless every value is finite.
pub(crate) fn ensure_finite(
    parameter: &'static str,
    values: &[f64],
) -> Result<(), NumericalInstability> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(NumericalInstability { parameter })
    }
}
