//! Objective contract, problem adapter and evaluation budget.

use super::bounds::Bounds;
use crate::error::{ConfigError, ObjectiveError};

/// A black-box objective to be minimized.
///
/// Any `Fn(&[f64]) -> f64` closure is an objective. Objectives that can fail
/// are wrapped in [`Fallible`].
///
/// For reproducible runs the objective must be a pure function of its input.
///
/// # Examples
///
/// ```
/// use u_evostrat::problem::Objective;
///
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]).unwrap(), 5.0);
/// ```
pub trait Objective: Send + Sync {
    /// Evaluates the objective at `x`. Lower is better.
    fn evaluate(&self, x: &[f64]) -> Result<f64, ObjectiveError>;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: &[f64]) -> Result<f64, ObjectiveError> {
        Ok(self(x))
    }
}

/// Adapter for objectives that report failures.
///
/// # Examples
///
/// ```
/// use u_evostrat::error::ObjectiveError;
/// use u_evostrat::problem::{Fallible, Objective};
///
/// let log_barrier = Fallible(|x: &[f64]| {
///     if x[0] <= 0.0 {
///         Err(ObjectiveError::new("outside domain"))
///     } else {
///         Ok(-x[0].ln())
///     }
/// });
/// assert!(log_barrier.evaluate(&[-1.0]).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F> Objective for Fallible<F>
where
    F: Fn(&[f64]) -> Result<f64, ObjectiveError> + Send + Sync,
{
    fn evaluate(&self, x: &[f64]) -> Result<f64, ObjectiveError> {
        (self.0)(x)
    }
}

/// An objective bound to its dimension and optional box bounds.
///
/// # Examples
///
/// ```
/// use u_evostrat::problem::{Bounds, Problem};
///
/// let problem = Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(), 4)
///     .unwrap()
///     .with_bounds(Bounds::uniform(4, -5.0, 5.0).unwrap())
///     .unwrap();
/// assert_eq!(problem.dimension(), 4);
/// ```
#[derive(Clone)]
pub struct Problem<F> {
    objective: F,
    dimension: usize,
    bounds: Option<Bounds>,
}

impl<F> std::fmt::Debug for Problem<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("dimension", &self.dimension)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<F: Objective> Problem<F> {
    /// Creates an unbounded problem of the given dimension.
    pub fn new(objective: F, dimension: usize) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        Ok(Self {
            objective,
            dimension,
            bounds: None,
        })
    }

    /// Attaches box bounds. Their dimension must match the problem's.
    pub fn with_bounds(mut self, bounds: Bounds) -> Result<Self, ConfigError> {
        if bounds.dimension() != self.dimension {
            return Err(ConfigError::BoundsMismatch {
                lower_len: bounds.lower().len(),
                upper_len: bounds.upper().len(),
                dimension: self.dimension,
            });
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// Problem dimension `n`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Box bounds, if any.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Evaluates the objective at `x`.
    ///
    /// A non-finite return value is reported as an [`ObjectiveError`].
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, ObjectiveError> {
        debug_assert_eq!(x.len(), self.dimension, "candidate has wrong dimension");
        let value = self.objective.evaluate(x)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ObjectiveError::new(format!(
                "objective returned non-finite value {value}"
            )))
        }
    }
}

/// Running evaluation count against an optional limit.
///
/// The count is monotonic and never exceeds the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationBudget {
    limit: Option<usize>,
    used: usize,
}

impl EvaluationBudget {
    /// Creates a fresh budget. `None` means unlimited.
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    /// Evaluations consumed so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Configured limit.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Evaluations still available, `None` if unlimited.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }

    /// Returns `true` once the limit is reached.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Records one evaluation. Returns `false` (and records nothing) when the
    /// budget is already exhausted.
    pub fn consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Problem::new(sphere, 0).unwrap_err();
        assert_eq!(err, ConfigError::ZeroDimension);
    }

    #[test]
    fn test_bounds_dimension_checked() {
        let err = Problem::new(sphere, 3)
            .unwrap()
            .with_bounds(Bounds::uniform(2, -1.0, 1.0).unwrap())
            .unwrap_err();
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_non_finite_value_is_an_error() {
        let problem = Problem::new(|_: &[f64]| f64::NAN, 1).unwrap();
        let err = problem.evaluate(&[0.0]).unwrap_err();
        assert!(err.message.contains("non-finite"), "got {err}");
    }

    #[test]
    fn test_fallible_objective_propagates() {
        let problem = Problem::new(
            Fallible(|x: &[f64]| {
                if x[0] < 0.0 {
                    Err(ObjectiveError::new("negative"))
                } else {
                    Ok(x[0])
                }
            }),
            1,
        )
        .unwrap();
        assert_eq!(problem.evaluate(&[2.0]).unwrap(), 2.0);
        assert_eq!(problem.evaluate(&[-2.0]).unwrap_err().message, "negative");
    }

    #[test]
    fn test_budget_never_exceeds_limit() {
        let mut budget = EvaluationBudget::new(Some(3));
        assert_eq!(budget.remaining(), Some(3));
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(budget.is_exhausted());
        assert!(!budget.consume());
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn test_unlimited_budget() {
        let mut budget = EvaluationBudget::new(None);
        for _ in 0..10 {
            assert!(budget.consume());
        }
        assert_eq!(budget.remaining(), None);
        assert!(!budget.is_exhausted());
    }
}
