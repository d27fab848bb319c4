//! Separable NES: axis-aligned Gaussian with one scale per coordinate.

use super::config::SnesConfig;
use crate::engine::{
    default_lambda, ensure_finite, initial_point, DistributionState, NumericalInstability, Strategy,
};
use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;

/// Distribution `N(m, diag(s)²)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnesState {
    mean: Vec<f64>,
    scales: Vec<f64>,
}

impl SnesState {
    /// Per-coordinate standard deviations `s`.
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

impl DistributionState for SnesState {
    fn mean(&self) -> &[f64] {
        &self.mean
    }

    fn spread(&self) -> Option<f64> {
        self.scales.iter().copied().reduce(f64::min)
    }
}

/// Separable Natural Evolution Strategy.
///
/// Samples `x = m + s ⊙ z` and follows the natural gradient of the expected
/// utility:
///
/// ```text
/// m ← m + η_m · s ⊙ Σ wᵢ zᵢ
/// s ← s ⊙ exp(η_s/2 · Σ wᵢ (zᵢ ⊙ zᵢ − 1))
/// ```
///
/// with NES utilities `wᵢ` (summing to zero). Cost per generation is `O(λn)`.
#[derive(Debug, Clone, Default)]
pub struct Snes {
    config: SnesConfig,
}

impl Snes {
    /// Creates the algorithm from its configuration.
    pub fn new(config: SnesConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SnesConfig {
        &self.config
    }
}

impl Strategy for Snes {
    type State = SnesState;

    fn name(&self) -> &'static str {
        "snes"
    }

    fn default_population_size(&self, dimension: usize) -> usize {
        default_lambda(dimension)
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
        Utility::Nes
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> SnesState {
        SnesState {
            mean: initial_point(self.config.initial_mean.as_deref(), dimension, sampler, ctx),
            scales: self.config.scales(dimension),
        }
    }

    fn sample(
        &self,
        state: &SnesState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        let n = state.mean.len();
        (0..lambda)
            .map(|i| {
                sampler.draw(ctx, i, n, |z| {
                    state
                        .mean
                        .iter()
                        .zip(&state.scales)
                        .zip(z)
                        .map(|((m, s), z)| m + s * z)
                        .collect()
                })
            })
            .collect()
    }

    fn update(
        &self,
        state: &mut SnesState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        let n = state.mean.len();
        let eta_m = self.config.mean_rate();
        let eta_s = self.config.scale_rate(n);

        let mut grad_mean = vec![0.0; n];
        let mut grad_scale = vec![0.0; n];
        for (pos, w) in ranking.weighted() {
            for (j, &z) in population[pos].noise.iter().enumerate() {
                grad_mean[j] += w * z;
                grad_scale[j] += w * (z * z - 1.0);
            }
        }

        let mean: Vec<f64> = state
            .mean
            .iter()
            .zip(&state.scales)
            .zip(&grad_mean)
            .map(|((m, s), g)| m + eta_m * s * g)
            .collect();
        let scales: Vec<f64> = state
            .scales
            .iter()
            .zip(&grad_scale)
            .map(|(s, g)| s * (0.5 * eta_s * g).exp())
            .collect();

        ensure_finite("mean", &mean)?;
        ensure_finite("scale", &scales)?;
        if scales.iter().any(|&s| s <= 0.0) {
            return Err(NumericalInstability { parameter: "scale" });
        }

        state.mean = mean;
        state.scales = scales;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Optimizer, RunConfig};
    use crate::problem::Problem;
    use crate::sampling::BoundPolicy;
    use crate::termination::TerminationReason;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_sphere_dimension_10_converges() {
        let problem = Problem::new(sphere, 10).unwrap();
        let strategy = Snes::new(SnesConfig::default().with_initial_mean(vec![1.0; 10]));
        let config = RunConfig::default()
            .with_population_size(20)
            .with_max_generations(2_000)
            .with_fitness_threshold(1e-6)
            .with_seed(42);

        let result = Optimizer::new(problem, strategy, config).unwrap().run().unwrap();
        assert!(
            result.best_fitness < 1e-6,
            "SNES should reach 1e-6 on the 10-d sphere, got {}",
            result.best_fitness
        );
        assert_eq!(result.termination, TerminationReason::FitnessThreshold);
        assert!(result.generations < 2_000);
    }

    #[test]
    fn test_scales_shrink_on_sphere() {
        let problem = Problem::new(sphere, 4).unwrap();
        let strategy = Snes::new(SnesConfig::default().with_initial_mean(vec![2.0; 4]));
        let optimizer = Optimizer::new(
            problem,
            strategy,
            RunConfig::default().with_max_generations(300),
        )
        .unwrap();
        let result = optimizer.run().unwrap();
        let spread = result.final_spread.unwrap();
        assert!(spread > 0.0 && spread < 0.1, "scale should shrink, got {spread}");
    }

    #[test]
    fn test_separable_scales_adapt_per_axis() {
        // Ill-conditioned ellipsoid: the first axis is 1000x steeper.
        let problem = Problem::new(|x: &[f64]| 1e6 * x[0] * x[0] + x[1] * x[1], 2).unwrap();
        let strategy = Snes::new(SnesConfig::default().with_initial_mean(vec![1.0, 1.0]));
        let optimizer = Optimizer::new(
            problem,
            strategy,
            RunConfig::default().with_max_generations(150).with_population_size(10),
        )
        .unwrap();
        let mut state = optimizer.initialize(3);
        while !optimizer.should_stop(&state) {
            optimizer.step(&mut state).unwrap();
        }
        let s = state.distribution().scales();
        assert!(s[0] < s[1], "steep axis should have the smaller scale: {s:?}");
    }

    #[test]
    fn test_zero_gradient_keeps_distribution() {
        let strategy = Snes::default();
        let sampler = Sampler::new(None, BoundPolicy::Clip);
        let mut ctx = RunContext::new(5);
        let mut state = strategy.initialize(3, &sampler, &mut ctx);
        let before = state.clone();

        let mut population = strategy.sample(&state, 1, &sampler, &mut ctx);
        population[0].fitness = Some(1.0);
        // A population of one has all-zero NES utilities.
        let ranking = Ranking::new(&population, &Utility::Nes);
        strategy.update(&mut state, &population, &ranking).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_population_of_one_runs() {
        let problem = Problem::new(sphere, 3).unwrap();
        let config = RunConfig::default()
            .with_population_size(1)
            .with_max_generations(10);
        let result = Optimizer::new(problem, Snes::default(), config)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.evaluations, 10);
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_mismatched_initial_mean_rejected() {
        let problem = Problem::new(sphere as fn(&[f64]) -> f64, 3).unwrap();
        let strategy = Snes::new(SnesConfig::default().with_initial_mean(vec![0.0; 2]));
        let err = Optimizer::new(problem, strategy, RunConfig::default()).unwrap_err();
        assert!(err.is_config_error());
    }
}
