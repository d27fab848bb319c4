//! Greedy hill climbers: fixed-scale and annealed.

use super::config::{ArhcConfig, RhcConfig};
use crate::engine::{initial_point, DistributionState, NumericalInstability, Strategy};
use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;
use tracing::trace;

/// Current point of a hill climber and its perturbation scale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClimberState {
    current: Vec<f64>,
    current_fitness: Option<f64>,
    sigma: f64,
}

impl ClimberState {
    /// Fitness of the current point; `None` until it has been evaluated.
    pub fn current_fitness(&self) -> Option<f64> {
        self.current_fitness
    }

    /// Perturbation scale `σ`.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    fn new(current: Vec<f64>, sigma: f64) -> Self {
        Self {
            current,
            current_fitness: None,
            sigma,
        }
    }

    /// Neighbours `current + σ·z`. Until the current point has a fitness,
    /// the first candidate is the current point itself.
    fn neighbours(&self, lambda: usize, sampler: &Sampler, ctx: &mut RunContext) -> Vec<Individual> {
        let n = self.current.len();
        (0..lambda)
            .map(|i| {
                if i == 0 && self.current_fitness.is_none() {
                    Individual::new(0, sampler.project(self.current.clone()), vec![0.0; n])
                } else {
                    sampler.draw(ctx, i, n, |z| {
                        self.current
                            .iter()
                            .zip(z)
                            .map(|(c, z)| c + self.sigma * z)
                            .collect()
                    })
                }
            })
            .collect()
    }

    /// Moves to the best candidate if it is strictly better.
    fn climb(&mut self, population: &[Individual], ranking: &Ranking) {
        let Some(best) = ranking.best().map(|pos| &population[pos]) else {
            return;
        };
        let fitness = best.fitness_or_worst();
        match self.current_fitness {
            Some(current) if fitness >= current => {
                trace!(candidate = fitness, current, "move rejected");
            }
            _ => {
                trace!(candidate = fitness, previous = ?self.current_fitness, "move accepted");
                self.current.clone_from(&best.x);
                self.current_fitness = Some(fitness);
            }
        }
    }
}

impl DistributionState for ClimberState {
    /// The current point.
    fn mean(&self) -> &[f64] {
        &self.current
    }

    fn spread(&self) -> Option<f64> {
        Some(self.sigma)
    }
}

/// Random Hill Climber: Gaussian neighbours of the current point with a
/// fixed scale, greedy acceptance.
///
/// The current point's fitness is monotone non-increasing.
#[derive(Debug, Clone, Default)]
pub struct RandomHillClimber {
    config: RhcConfig,
}

impl RandomHillClimber {
    /// Creates the algorithm from its configuration.
    pub fn new(config: RhcConfig) -> Self {
        Self { config }
    }
}

impl Strategy for RandomHillClimber {
    type State = ClimberState;

    fn name(&self) -> &'static str {
        "rhc"
    }

    fn default_population_size(&self, _dimension: usize) -> usize {
        1
    }

    fn validate(
        &self,
        dimension: usize,
        _population_size: usize,
        _bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError> {
        self.config.validate(dimension)
    }

    fn utility(&self, _population_size: usize) -> Utility {
        Utility::Best
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> ClimberState {
        let start = initial_point(self.config.initial_mean.as_deref(), dimension, sampler, ctx);
        ClimberState::new(start, self.config.step_size)
    }

    fn sample(
        &self,
        state: &ClimberState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        state.neighbours(lambda, sampler, ctx)
    }

    fn update(
        &self,
        state: &mut ClimberState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        state.climb(population, ranking);
        Ok(())
    }
}

/// Annealed Random Hill Climber.
///
/// Same acceptance rule as [`RandomHillClimber`]; the scale decays every
/// generation on a fixed schedule, `σ ← max(floor, decay · σ)`, whatever the
/// outcome.
#[derive(Debug, Clone, Default)]
pub struct AnnealedHillClimber {
    config: ArhcConfig,
}

impl AnnealedHillClimber {
    /// Creates the algorithm from its configuration.
    pub fn new(config: ArhcConfig) -> Self {
        Self { config }
    }
}

impl Strategy for AnnealedHillClimber {
    type State = ClimberState;

    fn name(&self) -> &'static str {
        "arhc"
    }

    fn default_population_size(&self, _dimension: usize) -> usize {
        1
    }

    fn validate(
        &self,
        dimension: usize,
        _population_size: usize,
        _bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError> {
        self.config.validate(dimension)
    }

    fn utility(&self, _population_size: usize) -> Utility {
        Utility::Best
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> ClimberState {
        let start = initial_point(self.config.initial_mean.as_deref(), dimension, sampler, ctx);
        ClimberState::new(start, self.config.initial_step_size)
    }

    fn sample(
        &self,
        state: &ClimberState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        state.neighbours(lambda, sampler, ctx)
    }

    fn update(
        &self,
        state: &mut ClimberState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        state.climb(population, ranking);
        state.sigma = (state.sigma * self.config.decay_rate).max(self.config.floor);
        Ok(())
    }
}
