//! Population-based black-box optimization engine.
//!
//! Minimizes real-valued objectives `f: R^n → R` with derivative-free,
//! stochastic search-distribution methods under one interface:
//!
//! - **Natural Evolution Strategies (NES)**: separable NES ([`nes::Snes`])
//!   and rank-one NES ([`nes::R1Nes`]), both linear in the dimension.
//! - **Self-adaptive ES**: the `(μ/μ_I, λ)-σSA-ES` ([`es::SaEs`]).
//! - **Random Search (RS)**: pure random search ([`rs::Prs`]), random hill
//!   climbing ([`rs::RandomHillClimber`]) and annealed hill climbing
//!   ([`rs::AnnealedHillClimber`]).
//!
//! # Architecture
//!
//! Every algorithm is a [`engine::Strategy`]: a sampler paired with a
//! distribution updater. The generic [`engine::Optimizer`] owns the rest of
//! the generation loop (evaluation, budget, fitness ranking, recording and
//! termination), so all algorithms share the same lifecycle:
//! `initialize → step* → finalize`.
//!
//! A run is a pure function of its configuration and seed. All randomness
//! flows through an explicit [`random::RunContext`]; independent runs can
//! execute in parallel (`parallel` feature) and still reproduce exactly.
//!
//! # Example
//!
//! ```
//! use u_evostrat::engine::{Optimizer, RunConfig};
//! use u_evostrat::nes::{Snes, SnesConfig};
//! use u_evostrat::problem::{Bounds, Problem};
//!
//! let problem = Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(), 10)
//!     .unwrap()
//!     .with_bounds(Bounds::uniform(10, -5.0, 5.0).unwrap())
//!     .unwrap();
//! let strategy = Snes::new(SnesConfig::default().with_initial_scale(2.0));
//! let config = RunConfig::default()
//!     .with_population_size(20)
//!     .with_max_evaluations(20_000)
//!     .with_fitness_threshold(1e-8)
//!     .with_seed(1);
//!
//! let result = Optimizer::new(problem, strategy, config).unwrap().run().unwrap();
//! assert!(result.best_fitness <= 1e-8);
//! assert!(result.evaluations <= 20_000);
//! ```

pub mod engine;
pub mod error;
pub mod es;
pub mod nes;
pub mod population;
pub mod problem;
pub mod random;
pub mod ranking;
pub mod recorder;
pub mod restart;
pub mod rs;
pub mod sampling;
pub mod termination;

pub use engine::{OptimizationResult, Optimizer, RunConfig};
pub use error::{ConfigError, ObjectiveError, OptimError, Result};
pub use problem::{Bounds, Problem};
pub use termination::TerminationReason;
