//! Stopping conditions.
//!
//! The policy is consulted after every generation; the evaluation budget is
//! additionally enforced per evaluation by the engine, so a run never
//! evaluates past its limit.

use std::time::Duration;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// `max_evaluations` reached.
    BudgetExhausted,
    /// `max_generations` reached.
    MaxGenerations,
    /// Best fitness reached `fitness_threshold`.
    FitnessThreshold,
    /// Population fitness range fell below `tolerance`.
    FitnessConverged,
    /// Distribution spread fell below the numerical floor.
    SpreadCollapsed,
    /// No sufficient improvement for `stagnation_limit` generations.
    Stagnation,
    /// Wall-clock limit reached.
    TimeLimit,
    /// Stopped externally before any other condition fired.
    Cancelled,
    /// The distribution update produced non-finite or degenerate parameters.
    NumericalInstability,
}

impl TerminationReason {
    /// Returns `true` for conditions local to one run (converged, stuck,
    /// degenerate) after which a restart can still make progress.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            TerminationReason::MaxGenerations
                | TerminationReason::FitnessConverged
                | TerminationReason::SpreadCollapsed
                | TerminationReason::Stagnation
                | TerminationReason::NumericalInstability
        )
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TerminationReason::BudgetExhausted => "evaluation budget exhausted",
            TerminationReason::MaxGenerations => "maximum generations reached",
            TerminationReason::FitnessThreshold => "fitness threshold reached",
            TerminationReason::FitnessConverged => "population fitness converged",
            TerminationReason::SpreadCollapsed => "distribution spread collapsed",
            TerminationReason::Stagnation => "best fitness stagnated",
            TerminationReason::TimeLimit => "time limit reached",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::NumericalInstability => "numerical instability",
        };
        f.write_str(text)
    }
}

/// Run progress as seen by the policy after a generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Evaluations consumed.
    pub evaluations: usize,
    /// Completed generations.
    pub generations: usize,
    /// Best fitness so far.
    pub best_fitness: f64,
    /// `max - min` fitness of the last generation.
    pub fitness_range: f64,
    /// Size of the last generation.
    pub population_size: usize,
    /// Smallest spread parameter of the distribution, if it has one.
    pub spread: Option<f64>,
    /// Consecutive generations without sufficient improvement.
    pub stagnant_generations: usize,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

/// Stopping conditions; any one that holds stops the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationPolicy {
    /// Evaluation budget.
    pub max_evaluations: Option<usize>,
    /// Generation limit.
    pub max_generations: Option<usize>,
    /// Stop once best fitness `<=` this value.
    pub fitness_threshold: Option<f64>,
    /// Population fitness range tolerance.
    pub tolerance: Option<f64>,
    /// Numerical floor for the spread parameter.
    pub min_spread: f64,
    /// Generations without improvement before stopping (0 = off).
    pub stagnation_limit: usize,
    /// Wall-clock limit.
    pub time_limit: Option<Duration>,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            max_evaluations: None,
            max_generations: None,
            fitness_threshold: None,
            tolerance: None,
            min_spread: 1e-12,
            stagnation_limit: 0,
            time_limit: None,
        }
    }
}

impl TerminationPolicy {
    /// Returns the first condition that holds, or `None` to continue.
    ///
    /// The fitness-range test needs at least two individuals; a population
    /// of one always has zero range.
    pub fn check(&self, progress: &Progress) -> Option<TerminationReason> {
        if self
            .max_evaluations
            .is_some_and(|limit| progress.evaluations >= limit)
        {
            return Some(TerminationReason::BudgetExhausted);
        }
        if self
            .fitness_threshold
            .is_some_and(|threshold| progress.best_fitness <= threshold)
        {
            return Some(TerminationReason::FitnessThreshold);
        }
        if self
            .max_generations
            .is_some_and(|limit| progress.generations >= limit)
        {
            return Some(TerminationReason::MaxGenerations);
        }
        if progress.spread.is_some_and(|s| s < self.min_spread) {
            return Some(TerminationReason::SpreadCollapsed);
        }
        if progress.population_size >= 2
            && self
                .tolerance
                .is_some_and(|tol| progress.fitness_range < tol)
        {
            return Some(TerminationReason::FitnessConverged);
        }
        if self.stagnation_limit > 0 && progress.stagnant_generations >= self.stagnation_limit {
            return Some(TerminationReason::Stagnation);
        }
        if self.time_limit.is_some_and(|limit| progress.elapsed >= limit) {
            return Some(TerminationReason::TimeLimit);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> Progress {
        Progress {
            evaluations: 10,
            generations: 2,
            best_fitness: 1.0,
            fitness_range: 0.5,
            population_size: 5,
            spread: Some(0.3),
            stagnant_generations: 0,
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_default_policy_never_stops() {
        assert_eq!(TerminationPolicy::default().check(&progress()), None);
    }

    #[test]
    fn test_budget() {
        let policy = TerminationPolicy {
            max_evaluations: Some(10),
            ..TerminationPolicy::default()
        };
        assert_eq!(policy.check(&progress()), Some(TerminationReason::BudgetExhausted));
    }

    #[test]
    fn test_generations_and_threshold() {
        let policy = TerminationPolicy {
            max_generations: Some(2),
            fitness_threshold: Some(1.0),
            ..TerminationPolicy::default()
        };
        // threshold is checked before the generation limit
        assert_eq!(policy.check(&progress()), Some(TerminationReason::FitnessThreshold));

        let policy = TerminationPolicy {
            max_generations: Some(2),
            ..TerminationPolicy::default()
        };
        assert_eq!(policy.check(&progress()), Some(TerminationReason::MaxGenerations));
    }

    #[test]
    fn test_spread_floor() {
        let policy = TerminationPolicy {
            min_spread: 0.5,
            ..TerminationPolicy::default()
        };
        assert_eq!(policy.check(&progress()), Some(TerminationReason::SpreadCollapsed));

        let mut p = progress();
        p.spread = None;
        assert_eq!(policy.check(&p), None);
    }

    #[test]
    fn test_tolerance_ignores_single_individual() {
        let policy = TerminationPolicy {
            tolerance: Some(1.0),
            ..TerminationPolicy::default()
        };
        assert_eq!(policy.check(&progress()), Some(TerminationReason::FitnessConverged));

        let mut p = progress();
        p.population_size = 1;
        p.fitness_range = 0.0;
        assert_eq!(policy.check(&p), None);
    }

    #[test]
    fn test_stagnation_and_time() {
        let policy = TerminationPolicy {
            stagnation_limit: 3,
            time_limit: Some(Duration::from_secs(60)),
            ..TerminationPolicy::default()
        };
        let mut p = progress();
        p.stagnant_generations = 3;
        assert_eq!(policy.check(&p), Some(TerminationReason::Stagnation));

        p.stagnant_generations = 0;
        p.elapsed = Duration::from_secs(61);
        assert_eq!(policy.check(&p), Some(TerminationReason::TimeLimit));
    }

    #[test]
    fn test_local_reasons() {
        assert!(TerminationReason::SpreadCollapsed.is_local());
        assert!(TerminationReason::NumericalInstability.is_local());
        assert!(!TerminationReason::BudgetExhausted.is_local());
        assert!(!TerminationReason::Cancelled.is_local());
        assert_eq!(TerminationReason::Stagnation.to_string(), "best fitness stagnated");
    }
}
