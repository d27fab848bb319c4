//! Generic optimization engine.
//!
//! Runs any [`Strategy`] against any [`Objective`](crate::problem::Objective)
//! with a shared generation loop:
//!
//! 1. **Sample** `λ` candidates from the current distribution.
//! 2. **Evaluate** them (sequentially or in parallel), counting every
//!    evaluation against the budget and updating the best-so-far solution.
//! 3. **Rank** by fitness and assign utility weights.
//! 4. **Update** the distribution.
//! 5. **Record** the generation and check the termination policy.
//!
//! # Reproducibility
//!
//! A run is determined by its seed: all random draws come from the run's
//! [`RunContext`](crate::random::RunContext) in a fixed order, and parallel
//! evaluation results are folded back in sampling order.

mod config;
mod runner;
mod types;

pub use config::{EvaluationPolicy, RunConfig};
pub use runner::{OptimizationResult, Optimizer, RunState};
pub use types::{DistributionState, NumericalInstability, Strategy};

pub(crate) use types::{
    check_dimension, check_learning_rate, check_spread, default_lambda, ensure_finite,
    initial_point,
};
