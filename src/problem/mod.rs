//! Problem definition: objective, dimension, box bounds and evaluation budget.
//!
//! The engine only consumes the [`Objective`] contract: a function of a real
//! vector returning a finite scalar, to be **minimized**. Everything else a
//! benchmark suite might carry (names, optima, plotting metadata) lives
//! outside this crate.

mod bounds;
mod types;

pub use bounds::Bounds;
pub use types::{EvaluationBudget, Fallible, Objective, Problem};
