//! Restart driver: repeated independent runs sharing one evaluation budget.
//!
//! After a run stops for a local reason (converged, stagnated, generation
//! limit, numerical instability) a fresh run is started with a larger
//! population and a seed derived from the base seed. Global reasons
//! (budget, fitness threshold, time limit, cancellation) end the sequence.
//!
//! # References
//!
//! - Auger & Hansen (2005), "A Restart CMA Evolution Strategy With
//!   Increasing Population Size"

use crate::engine::{OptimizationResult, Optimizer, Strategy};
use crate::error::{ConfigError, Result};
use crate::problem::Objective;
use crate::random::RunContext;
use crate::termination::TerminationReason;
use tracing::info;

/// Restart schedule.
///
/// # Examples
///
/// ```
/// use u_evostrat::restart::RestartConfig;
///
/// let config = RestartConfig::default().with_max_restarts(4);
/// assert_eq!(config.population_growth, 2);
/// assert_eq!(config.population_size(10, 3), 80);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestartConfig {
    /// Restarts after the first run.
    pub max_restarts: usize,

    /// Population multiplier per restart (1 keeps it constant).
    pub population_growth: usize,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            max_restarts: 9,
            population_growth: 2,
        }
    }
}

impl RestartConfig {
    /// Sets the number of restarts.
    pub fn with_max_restarts(mut self, n: usize) -> Self {
        self.max_restarts = n;
        self
    }

    /// Sets the population multiplier.
    pub fn with_population_growth(mut self, growth: usize) -> Self {
        self.population_growth = growth;
        self
    }

    /// Population size of the `restart`-th run (0 = first run).
    pub fn population_size(&self, initial: usize, restart: usize) -> usize {
        let factor = u32::try_from(restart)
            .ok()
            .and_then(|r| self.population_growth.checked_pow(r))
            .unwrap_or(usize::MAX);
        initial.saturating_mul(factor)
    }

    /// Validates the schedule.
    pub fn validate(&self) -> Result<()> {
        if self.population_growth == 0 {
            return Err(ConfigError::ZeroPopulation.into());
        }
        Ok(())
    }
}

/// Outcome of one run within a restart sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Seed of the run.
    pub seed: u64,
    /// Population size of the run.
    pub population_size: usize,
    /// Evaluations the run consumed.
    pub evaluations: usize,
    /// Generations the run completed.
    pub generations: usize,
    /// Best fitness the run found.
    pub best_fitness: f64,
    /// Why the run stopped.
    pub termination: TerminationReason,
}

/// Outcome of a restart sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestartResult {
    /// Full result of the run that found the best solution.
    pub best: OptimizationResult,
    /// One summary per run, in execution order.
    pub runs: Vec<RunSummary>,
    /// Evaluations over all runs; never exceeds the configured budget.
    pub total_evaluations: usize,
}

impl RestartResult {
    fn first(result: OptimizationResult, population_size: usize) -> Self {
        let mut out = Self {
            runs: Vec::new(),
            total_evaluations: 0,
            best: result.clone(),
        };
        out.push(result, population_size);
        out
    }

    fn push(&mut self, result: OptimizationResult, population_size: usize) {
        self.total_evaluations += result.evaluations;
        self.runs.push(RunSummary {
            seed: result.seed,
            population_size,
            evaluations: result.evaluations,
            generations: result.generations,
            best_fitness: result.best_fitness,
            termination: result.termination,
        });
        if result.best_fitness < self.best.best_fitness {
            self.best = result;
        }
    }

    fn last_termination(&self) -> Option<TerminationReason> {
        self.runs.last().map(|run| run.termination)
    }
}

impl<F: Objective, S: Strategy> Optimizer<F, S> {
    /// Runs with restarts, starting from the configured seed.
    ///
    /// The first run uses the configured seed and population size; restart
    /// `r` uses `RunContext::child_seed(seed, r)` and `λ · growth^r`. All
    /// runs draw from the same `max_evaluations` budget, while
    /// `max_generations` applies to each run separately.
    pub fn run_with_restarts(&self, restarts: &RestartConfig) -> Result<RestartResult> {
        restarts.validate()?;
        let base_seed = self.config().seed;
        let limit = self.config().max_evaluations;
        let initial = self.population_size();

        let first = self.execute(self.initialize_with(base_seed, initial, limit), None)?;
        let mut outcome = RestartResult::first(first, initial);

        for restart in 1..=restarts.max_restarts {
            if !outcome.last_termination().is_some_and(|r| r.is_local()) {
                break;
            }
            let remaining = limit.map(|l| l.saturating_sub(outcome.total_evaluations));
            if remaining == Some(0) {
                break;
            }

            let seed = RunContext::child_seed(base_seed, restart as u64);
            let population_size = restarts.population_size(initial, restart);
            info!(
                algorithm = self.strategy().name(),
                restart,
                seed,
                population_size,
                best_fitness = outcome.best.best_fitness,
                "restarting"
            );
            let result = self.execute(self.initialize_with(seed, population_size, remaining), None)?;
            outcome.push(result, population_size);
        }

        Ok(outcome)
    }
}
