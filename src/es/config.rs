//! Self-adaptive ES configuration.

use crate::engine::{check_dimension, check_learning_rate, check_spread};
use crate::error::ConfigError;
use crate::ranking::Recombination;

/// Configuration for the `(μ/μ_I, λ)-σSA-ES`.
///
/// # Examples
///
/// ```
/// use u_evostrat::es::SaEsConfig;
/// use u_evostrat::ranking::Recombination;
///
/// let config = SaEsConfig::default()
///     .with_initial_step_size(0.3)
///     .with_parents(3)
///     .with_recombination(Recombination::Weighted);
/// assert!(config.validate(5, 12).is_ok());
/// assert!(config.validate(5, 2).is_err());
/// assert_eq!(SaEsConfig::default().parents_for(12), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaEsConfig {
    /// Starting mean. `None` draws it uniformly from the bounds, or uses the
    /// origin for unbounded problems.
    pub initial_mean: Option<Vec<f64>>,

    /// Starting global step size `σ`.
    pub initial_step_size: f64,

    /// Number of selected parents `μ`. Default: `max(1, ⌊λ/2⌋)`.
    pub parents: Option<usize>,

    /// Weighting of the selected parents in the recombination.
    pub recombination: Recombination,

    /// Self-adaptation rate `τ`. Default: `1/√(2n)`.
    pub learning_rate: Option<f64>,
}

impl Default for SaEsConfig {
    fn default() -> Self {
        Self {
            initial_mean: None,
            initial_step_size: 1.0,
            parents: None,
            recombination: Recombination::Equal,
            learning_rate: None,
        }
    }
}

impl SaEsConfig {
    /// Sets the starting mean.
    pub fn with_initial_mean(mut self, mean: Vec<f64>) -> Self {
        self.initial_mean = Some(mean);
        self
    }

    /// Sets the starting step size.
    pub fn with_initial_step_size(mut self, sigma: f64) -> Self {
        self.initial_step_size = sigma;
        self
    }

    /// Sets the number of parents `μ`.
    pub fn with_parents(mut self, mu: usize) -> Self {
        self.parents = Some(mu);
        self
    }

    /// Sets the parent weighting.
    pub fn with_recombination(mut self, recombination: Recombination) -> Self {
        self.recombination = recombination;
        self
    }

    /// Overrides `τ`.
    pub fn with_learning_rate(mut self, tau: f64) -> Self {
        self.learning_rate = Some(tau);
        self
    }

    /// Effective `τ`.
    pub fn tau(&self, dimension: usize) -> f64 {
        self.learning_rate
            .unwrap_or_else(|| 1.0 / (2.0 * dimension.max(1) as f64).sqrt())
    }

    /// Effective `μ` for a population of `lambda`.
    pub fn parents_for(&self, lambda: usize) -> usize {
        self.parents.unwrap_or((lambda / 2).max(1))
    }

    /// Validates the configuration against a problem dimension and
    /// population size.
    pub fn validate(&self, dimension: usize, population_size: usize) -> Result<(), ConfigError> {
        check_dimension("initial_mean", self.initial_mean.as_deref(), dimension)?;
        check_spread(self.initial_step_size)?;
        check_learning_rate("learning_rate", self.learning_rate)?;
        let mu = self.parents_for(population_size);
        if mu == 0 || mu > population_size {
            return Err(ConfigError::InvalidParents {
                parents: mu,
                population: population_size,
            });
        }
        Ok(())
    }
}
