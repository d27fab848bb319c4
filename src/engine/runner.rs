//! Generation loop: sample → evaluate → rank → update → check termination.
//!
//! [`Optimizer`] exposes the loop as four operations (`initialize`, `step`,
//! `should_stop`, `finalize`) so callers can drive it manually, plus `run*`
//! helpers that do it for them. A run is a pure function of the optimizer
//! and a seed: all randomness lives in the [`RunState`]'s context.

use super::config::{EvaluationPolicy, RunConfig};
use super::types::{DistributionState, Strategy};
use crate::error::{ObjectiveError, OptimError, Result};
use crate::population::{Individual, PopulationStats};
use crate::problem::{EvaluationBudget, Objective, Problem};
use crate::random::RunContext;
use crate::ranking::Ranking;
use crate::recorder::{BestSolution, GenerationRecord, Recorder, Records};
use crate::sampling::Sampler;
use crate::termination::{Progress, TerminationPolicy, TerminationReason};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct RunState<D> {
    distribution: D,
    context: RunContext,
    budget: EvaluationBudget,
    recorder: Recorder,
    population_size: usize,
    stagnant_generations: usize,
    termination: Option<TerminationReason>,
    started: Instant,
}

impl<D: DistributionState> RunState<D> {
    /// Current distribution parameters.
    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    /// Completed generations.
    pub fn generation(&self) -> usize {
        self.context.generation()
    }

    /// Evaluations consumed.
    pub fn evaluations(&self) -> usize {
        self.budget.used()
    }

    /// Population size `λ` of this run.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Seed of this run.
    pub fn seed(&self) -> u64 {
        self.context.seed()
    }

    /// Best solution so far.
    pub fn best(&self) -> Option<&BestSolution> {
        self.recorder.best()
    }

    /// Kept generation records.
    pub fn records(&self) -> Records<'_> {
        self.recorder.records()
    }

    /// Record of the most recent generation.
    pub fn last_record(&self) -> Option<&GenerationRecord> {
        self.recorder.last()
    }

    /// Why the run stopped, once it has.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// Algorithm name.
    pub algorithm: String,
    /// Seed the run used.
    pub seed: u64,
    /// Best decision vector found.
    pub best_x: Vec<f64>,
    /// Fitness of `best_x` (`+inf` if nothing was evaluated).
    pub best_fitness: f64,
    /// 1-based evaluation index at which `best_x` was found.
    pub best_evaluation: usize,
    /// Total evaluations consumed.
    pub evaluations: usize,
    /// Completed generations.
    pub generations: usize,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Distribution mean at the end of the run.
    pub final_mean: Vec<f64>,
    /// Distribution spread at the end of the run.
    pub final_spread: Option<f64>,
    /// Kept generation records.
    pub history: Vec<GenerationRecord>,
}

impl OptimizationResult {
    /// Iterates the generation records; call again to start over.
    pub fn records(&self) -> Records<'_> {
        Records::new(&self.history)
    }
}

/// A validated problem + algorithm + run configuration.
///
/// # Examples
///
/// ```
/// use u_evostrat::engine::{Optimizer, RunConfig};
/// use u_evostrat::nes::{Snes, SnesConfig};
/// use u_evostrat::problem::Problem;
///
/// let problem = Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(), 5).unwrap();
/// let strategy = Snes::new(SnesConfig::default().with_initial_mean(vec![1.0; 5]));
/// let config = RunConfig::default().with_max_generations(300).with_seed(7);
///
/// let optimizer = Optimizer::new(problem, strategy, config).unwrap();
/// let result = optimizer.run().unwrap();
/// assert!(result.best_fitness < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Optimizer<F, S> {
    problem: Problem<F>,
    strategy: S,
    config: RunConfig,
    population_size: usize,
    sampler: Sampler,
    policy: TerminationPolicy,
}

impl<F: Objective, S: Strategy> Optimizer<F, S> {
    /// Validates everything up front; an optimizer that exists can run.
    pub fn new(problem: Problem<F>, strategy: S, config: RunConfig) -> Result<Self> {
        config.validate()?;
        let dimension = problem.dimension();
        let population_size = config
            .population_size
            .unwrap_or_else(|| strategy.default_population_size(dimension));
        strategy.validate(dimension, population_size, problem.bounds())?;

        Ok(Self {
            sampler: Sampler::new(problem.bounds().cloned(), config.bound_policy),
            policy: config.termination_policy(),
            problem,
            strategy,
            config,
            population_size,
        })
    }

    /// The problem being optimized.
    pub fn problem(&self) -> &Problem<F> {
        &self.problem
    }

    /// The algorithm.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Resolved population size `λ`.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Creates the state of a fresh run with the given seed.
    pub fn initialize(&self, seed: u64) -> RunState<S::State> {
        self.initialize_with(seed, self.population_size, self.config.max_evaluations)
    }

    pub(crate) fn initialize_with(
        &self,
        seed: u64,
        population_size: usize,
        max_evaluations: Option<usize>,
    ) -> RunState<S::State> {
        let mut context = RunContext::new(seed);
        let distribution = self
            .strategy
            .initialize(self.problem.dimension(), &self.sampler, &mut context);

        info!(
            algorithm = self.strategy.name(),
            dimension = self.problem.dimension(),
            population_size,
            seed,
            "run initialized"
        );

        RunState {
            distribution,
            context,
            budget: EvaluationBudget::new(max_evaluations),
            recorder: Recorder::new(self.config.record_interval),
            population_size,
            stagnant_generations: 0,
            termination: None,
            started: Instant::now(),
        }
    }

    /// Runs one generation. A stopped run is left untouched.
    ///
    /// The last generation shrinks to the remaining budget, so the budget is
    /// never exceeded.
    pub fn step(&self, state: &mut RunState<S::State>) -> Result<()> {
        if state.termination.is_some() {
            return Ok(());
        }

        let lambda = state
            .budget
            .remaining()
            .map_or(state.population_size, |left| left.min(state.population_size));
        if lambda == 0 {
            state.termination = Some(TerminationReason::BudgetExhausted);
            return Ok(());
        }

        let mut population =
            self.strategy
                .sample(&state.distribution, lambda, &self.sampler, &mut state.context);
        debug_assert_eq!(population.len(), lambda, "strategy sampled wrong population size");

        let best_before = state.recorder.best_fitness();
        self.evaluate(state, &mut population)?;

        let ranking = Ranking::new(&population, &self.strategy.utility(state.population_size));
        let instability = self
            .strategy
            .update(&mut state.distribution, &population, &ranking)
            .err();
        debug_assert_eq!(state.distribution.mean().len(), self.problem.dimension());
        state.context.advance_generation();

        let best_so_far = state.recorder.best_fitness();
        self.track_stagnation(state, best_before, best_so_far);

        let Some(stats) = PopulationStats::of(&population) else {
            return Ok(());
        };
        let spread = state.distribution.spread();
        let generation = state.context.generation();
        debug!(
            algorithm = self.strategy.name(),
            generation,
            evaluations = state.budget.used(),
            best_so_far,
            generation_best = stats.best,
            spread,
            "generation complete"
        );
        state.recorder.close_generation(GenerationRecord {
            generation,
            evaluations: state.budget.used(),
            best_so_far,
            generation_best: stats.best,
            generation_mean: stats.mean,
            spread,
        });

        state.termination = match instability {
            Some(err) => {
                warn!(
                    algorithm = self.strategy.name(),
                    generation,
                    error = %err,
                    "numerical instability, stopping with best so far"
                );
                Some(TerminationReason::NumericalInstability)
            }
            None => self.policy.check(&Progress {
                evaluations: state.budget.used(),
                generations: generation,
                best_fitness: best_so_far,
                fitness_range: stats.range,
                population_size: stats.size,
                spread,
                stagnant_generations: state.stagnant_generations,
                elapsed: state.started.elapsed(),
            }),
        };
        Ok(())
    }

    /// Returns `true` once a termination condition has fired.
    pub fn should_stop(&self, state: &RunState<S::State>) -> bool {
        state.termination.is_some()
    }

    /// Converts a run state into its result.
    ///
    /// Finalizing a run that has not stopped reports it as
    /// [`TerminationReason::Cancelled`].
    pub fn finalize(&self, state: RunState<S::State>) -> OptimizationResult {
        let termination = state.termination.unwrap_or(TerminationReason::Cancelled);
        let seed = state.context.seed();
        let generations = state.context.generation();
        let evaluations = state.budget.used();
        let final_mean = state.distribution.mean().to_vec();
        let final_spread = state.distribution.spread();
        let (best, history) = state.recorder.into_parts();

        let (best_x, best_fitness, best_evaluation) = match best {
            Some(best) => (best.x, best.fitness, best.evaluation),
            None => (final_mean.clone(), f64::INFINITY, 0),
        };

        info!(
            algorithm = self.strategy.name(),
            seed,
            generations,
            evaluations,
            best_fitness,
            reason = %termination,
            "run finished"
        );

        OptimizationResult {
            algorithm: self.strategy.name().to_string(),
            seed,
            best_x,
            best_fitness,
            best_evaluation,
            evaluations,
            generations,
            termination,
            final_mean,
            final_spread,
            history,
        }
    }

    /// Runs to completion with the configured seed.
    pub fn run(&self) -> Result<OptimizationResult> {
        self.run_with_seed(self.config.seed)
    }

    /// Runs to completion with an explicit seed.
    pub fn run_with_seed(&self, seed: u64) -> Result<OptimizationResult> {
        self.execute(self.initialize(seed), None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is set to `true`, the run stops before the next generation
    /// and returns the best solution found so far.
    pub fn run_with_cancel(&self, cancel: Option<Arc<AtomicBool>>) -> Result<OptimizationResult> {
        self.execute(self.initialize(self.config.seed), cancel.as_deref())
    }

    /// Runs one independent run per seed.
    ///
    /// With the `parallel` feature the runs execute concurrently; each result
    /// is identical to `run_with_seed` for its seed.
    pub fn run_seeds(&self, seeds: &[u64]) -> Vec<Result<OptimizationResult>> {
        self.run_each(seeds)
    }

    pub(crate) fn execute(
        &self,
        mut state: RunState<S::State>,
        cancel: Option<&AtomicBool>,
    ) -> Result<OptimizationResult> {
        while !self.should_stop(&state) {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                state.termination = Some(TerminationReason::Cancelled);
                break;
            }
            self.step(&mut state)?;
        }
        Ok(self.finalize(state))
    }

    #[cfg(feature = "parallel")]
    fn run_each(&self, seeds: &[u64]) -> Vec<Result<OptimizationResult>> {
        seeds.par_iter().map(|&seed| self.run_with_seed(seed)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_each(&self, seeds: &[u64]) -> Vec<Result<OptimizationResult>> {
        seeds.iter().map(|&seed| self.run_with_seed(seed)).collect()
    }

    /// Evaluates a generation and folds every result into the run state in
    /// population order, whatever order the evaluations completed in.
    fn evaluate(&self, state: &mut RunState<S::State>, population: &mut [Individual]) -> Result<()> {
        if cfg!(feature = "parallel") && self.config.parallel {
            let results = self.evaluate_batch(population);
            for (ind, result) in population.iter_mut().zip(results) {
                self.absorb(state, ind, result)?;
            }
        } else {
            for ind in population.iter_mut() {
                let result = self.problem.evaluate(&ind.x);
                self.absorb(state, ind, result)?;
            }
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn evaluate_batch(&self, population: &[Individual]) -> Vec<std::result::Result<f64, ObjectiveError>> {
        population
            .par_iter()
            .map(|ind| self.problem.evaluate(&ind.x))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_batch(&self, population: &[Individual]) -> Vec<std::result::Result<f64, ObjectiveError>> {
        population
            .iter()
            .map(|ind| self.problem.evaluate(&ind.x))
            .collect()
    }

    fn absorb(
        &self,
        state: &mut RunState<S::State>,
        ind: &mut Individual,
        result: std::result::Result<f64, ObjectiveError>,
    ) -> Result<()> {
        let counted = state.budget.consume();
        debug_assert!(counted, "evaluated past the budget");
        let evaluation = state.budget.used();

        let fitness = match result {
            Ok(fitness) => fitness,
            Err(err) => match self.config.evaluation_policy {
                EvaluationPolicy::Abort => {
                    return Err(OptimError::Evaluation {
                        evaluation,
                        message: err.message,
                    });
                }
                EvaluationPolicy::Penalize => {
                    warn!(evaluation, error = %err, "objective failed, candidate penalized");
                    f64::INFINITY
                }
            },
        };

        ind.fitness = Some(fitness);
        state.recorder.observe(&ind.x, fitness, evaluation);
        Ok(())
    }

    fn track_stagnation(&self, state: &mut RunState<S::State>, before: f64, after: f64) {
        let improved = after < before
            && (before.is_infinite()
                || (before - after).abs() / before.abs() >= self.config.stagnation_threshold);
        if improved {
            state.stagnant_generations = 0;
        } else {
            state.stagnant_generations += 1;
        }
    }
}
