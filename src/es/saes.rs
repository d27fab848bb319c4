//! `(μ/μ_I, λ)-σSA-ES`: intermediate recombination with self-adapted σ.

use super::config::SaEsConfig;
use crate::engine::{
    default_lambda, ensure_finite, initial_point, DistributionState, NumericalInstability, Strategy,
};
use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;

/// Parent mean and global step size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaEsState {
    mean: Vec<f64>,
    sigma: f64,
}

impl SaEsState {
    /// Global step size `σ`.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl DistributionState for SaEsState {
    fn mean(&self) -> &[f64] {
        &self.mean
    }

    fn spread(&self) -> Option<f64> {
        Some(self.sigma)
    }
}

/// Self-adaptive Evolution Strategy.
///
/// Each offspring mutates its own step size log-normally before it is
/// placed:
///
/// ```text
/// σᵢ = σ · exp(τ · N(0, 1))
/// xᵢ = m + σᵢ · zᵢ
/// ```
///
/// The `μ` best offspring are recombined: the new mean is the weighted mean
/// of their positions and the new `σ` the weighted mean of their `σᵢ`.
/// Selection is comma (parents never survive).
#[derive(Debug, Clone, Default)]
pub struct SaEs {
    config: SaEsConfig,
}

impl SaEs {
    /// Creates the algorithm from its configuration.
    pub fn new(config: SaEsConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SaEsConfig {
        &self.config
    }
}

impl Strategy for SaEs {
    type State = SaEsState;

    fn name(&self) -> &'static str {
        "sa-es"
    }

    fn default_population_size(&self, dimension: usize) -> usize {
        default_lambda(dimension)
    }

    fn validate(
        &self,
        dimension: usize,
        population_size: usize,
        _bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError> {
        self.config.validate(dimension, population_size)
    }

    fn utility(&self, population_size: usize) -> Utility {
        Utility::Truncation {
            parents: self.config.parents_for(population_size),
            recombination: self.config.recombination,
        }
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> SaEsState {
        SaEsState {
            mean: initial_point(self.config.initial_mean.as_deref(), dimension, sampler, ctx),
            sigma: self.config.initial_step_size,
        }
    }

    fn sample(
        &self,
        state: &SaEsState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        let n = state.mean.len();
        let tau = self.config.tau(n);
        (0..lambda)
            .map(|i| {
                let sigma_i = state.sigma * (tau * ctx.standard_normal()).exp();
                sampler
                    .draw(ctx, i, n, |z| {
                        state.mean.iter().zip(z).map(|(m, z)| m + sigma_i * z).collect()
                    })
                    .with_step_size(sigma_i)
            })
            .collect()
    }

    fn update(
        &self,
        state: &mut SaEsState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        let n = state.mean.len();
        let mut mean = vec![0.0; n];
        let mut sigma = 0.0;
        for (pos, w) in ranking.weighted().filter(|&(_, w)| w > 0.0) {
            let ind = &population[pos];
            for (m, x) in mean.iter_mut().zip(&ind.x) {
                *m += w * x;
            }
            sigma += w * ind.step_size.unwrap_or(state.sigma);
        }

        ensure_finite("mean", &mean)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(NumericalInstability { parameter: "sigma" });
        }

        state.mean = mean;
        state.sigma = sigma;
        Ok(())
    }
}
