//! Pure random search.

use super::config::PrsConfig;
use crate::engine::{DistributionState, NumericalInstability, Strategy};
use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;

/// Best point drawn so far. It does not influence sampling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrsState {
    point: Vec<f64>,
    fitness: Option<f64>,
}

impl PrsState {
    /// Fitness of [`DistributionState::mean`], once something was evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }
}

impl DistributionState for PrsState {
    /// Best point so far (the box center before the first generation).
    fn mean(&self) -> &[f64] {
        &self.point
    }

    fn spread(&self) -> Option<f64> {
        None
    }
}

/// Pure Random Search: uniform draws over the box, independent of history.
///
/// The baseline every other algorithm should beat.
#[derive(Debug, Clone, Default)]
pub struct Prs {
    config: PrsConfig,
}

impl Prs {
    /// Creates the algorithm from its configuration.
    pub fn new(config: PrsConfig) -> Self {
        Self { config }
    }
}

impl Strategy for Prs {
    type State = PrsState;

    fn name(&self) -> &'static str {
        "prs"
    }

    fn default_population_size(&self, _dimension: usize) -> usize {
        1
    }

    fn validate(
        &self,
        _dimension: usize,
        _population_size: usize,
        bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError> {
        self.config.validate(bounds)
    }

    fn utility(&self, _population_size: usize) -> Utility {
        Utility::Best
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, _ctx: &mut RunContext) -> PrsState {
        PrsState {
            point: sampler
                .bounds()
                .map_or_else(|| vec![0.0; dimension], Bounds::center),
            fitness: None,
        }
    }

    fn sample(
        &self,
        state: &PrsState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        (0..lambda)
            .map(|i| {
                sampler
                    .uniform(ctx, i)
                    .unwrap_or_else(|| Individual::new(i, state.point.clone(), Vec::new()))
            })
            .collect()
    }

    fn update(
        &self,
        state: &mut PrsState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        if let Some(best) = ranking.best().map(|pos| &population[pos]) {
            let fitness = best.fitness_or_worst();
            if state.fitness.is_none_or(|current| fitness < current) {
                state.point.clone_from(&best.x);
                state.fitness = Some(fitness);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Optimizer, RunConfig};
    use crate::problem::Problem;
    use crate::termination::TerminationReason;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn boxed_sphere(dimension: usize) -> Problem<fn(&[f64]) -> f64> {
        Problem::new(sphere as fn(&[f64]) -> f64, dimension)
            .unwrap()
            .with_bounds(Bounds::uniform(dimension, -1.0, 1.0).unwrap())
            .unwrap()
    }

    #[test]
    fn test_beats_uniform_expectation() {
        // E[f(x)] for x ~ U[-1, 1]^10 is 10/3.
        let config = RunConfig::default()
            .without_generation_limit()
            .with_max_evaluations(100_000)
            .with_record_interval(1_000);
        let optimizer = Optimizer::new(boxed_sphere(10), Prs::default(), config).unwrap();
        let result = optimizer.run().unwrap();

        assert_eq!(result.evaluations, 100_000);
        assert_eq!(result.termination, TerminationReason::BudgetExhausted);
        assert!(result.best_fitness < 10.0 / 3.0, "got {}", result.best_fitness);
        assert_eq!(result, optimizer.run().unwrap(), "same seed, same result");
    }

    #[test]
    fn test_draws_stay_in_box() {
        let optimizer = Optimizer::new(
            boxed_sphere(4),
            Prs::default(),
            RunConfig::default().with_population_size(16).with_max_generations(50),
        )
        .unwrap();
        let mut state = optimizer.initialize(1);
        let bounds = Bounds::uniform(4, -1.0, 1.0).unwrap();
        assert_eq!(state.distribution().mean(), &[0.0; 4]);
        while !optimizer.should_stop(&state) {
            optimizer.step(&mut state).unwrap();
            assert!(bounds.contains(state.distribution().mean()));
        }
        assert_eq!(state.distribution().fitness(), state.best().map(|b| b.fitness));
    }

    #[test]
    fn test_huge_box_runs() {
        let problem = Problem::new(|x: &[f64]| x.iter().map(|v| v.abs()).sum::<f64>().min(1e300), 2)
            .unwrap()
            .with_bounds(Bounds::uniform(2, -1e308, 1e308).unwrap())
            .unwrap();
        let optimizer = Optimizer::new(
            problem,
            Prs::default(),
            RunConfig::default().with_population_size(8).with_max_generations(3),
        )
        .unwrap();
        let mut state = optimizer.initialize(5);
        assert_eq!(state.distribution().mean(), &[0.0, 0.0]);
        while !optimizer.should_stop(&state) {
            optimizer.step(&mut state).unwrap();
        }
        let best = state.best().unwrap();
        assert_eq!(state.evaluations(), 24);
        assert!(best.x.iter().all(|v| v.is_finite() && v.abs() <= 1e308));
    }

    #[test]
    fn test_unbounded_problem_rejected() {
        let problem = Problem::new(sphere as fn(&[f64]) -> f64, 3).unwrap();
        let err = Optimizer::new(problem, Prs::default(), RunConfig::default()).unwrap_err();
        assert!(err.is_config_error());
    }
}
