//! Fitness ranking and rank-based utility weights (fitness shaping).
//!
//! Updates never see raw fitness values: the population is sorted
//! (ascending, minimization) and every rank receives a fixed,
//! non-increasing weight. This makes all algorithms invariant to
//! monotone transformations of the objective.
//!
//! # References
//!
//! - Wierstra et al. (2014), "Natural Evolution Strategies", JMLR 15
//! - Hansen (2016), "The CMA Evolution Strategy: A Tutorial"

use crate::population::Individual;
use std::cmp::Ordering;

/// Recombination weights for truncation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recombination {
    /// Every selected parent weighs `1/μ`.
    #[default]
    Equal,
    /// Log-decreasing weights `ln(μ + 1/2) - ln(i)`, normalized.
    Weighted,
}

/// Rank-to-weight mapping supplied by an algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Utility {
    /// NES utilities `max(0, ln(λ/2 + 1) - ln i) / Σ - 1/λ`; weights sum to 0.
    Nes,
    /// Top `parents` ranks share weight 1; the rest get 0.
    Truncation {
        /// Number of selected parents `μ`.
        parents: usize,
        /// Weighting among the selected parents.
        recombination: Recombination,
    },
    /// Weight 1 on the best rank only.
    Best,
}

impl Utility {
    /// Weights for ranks `0..lambda` (0 = best).
    pub fn weights(&self, lambda: usize) -> Vec<f64> {
        match *self {
            Utility::Nes => nes_utilities(lambda),
            Utility::Truncation {
                parents,
                recombination,
            } => truncation_weights(parents, lambda, recombination),
            Utility::Best => truncation_weights(1, lambda, Recombination::Equal),
        }
    }
}

/// NES fitness-shaping utilities for `lambda` ranks.
///
/// Non-increasing in rank and summing to zero, so better-than-median
/// candidates pull the distribution and worse ones push it away.
pub fn nes_utilities(lambda: usize) -> Vec<f64> {
    if lambda == 0 {
        return Vec::new();
    }
    let log_half = (lambda as f64 / 2.0 + 1.0).ln();
    let raw: Vec<f64> = (1..=lambda)
        .map(|rank| (log_half - (rank as f64).ln()).max(0.0))
        .collect();
    let sum: f64 = raw.iter().sum();
    let baseline = 1.0 / lambda as f64;
    raw.into_iter().map(|u| u / sum - baseline).collect()
}

/// Truncation weights: the best `min(parents, lambda)` ranks sum to 1.
pub fn truncation_weights(parents: usize, lambda: usize, recombination: Recombination) -> Vec<f64> {
    let mu = parents.min(lambda);
    let mut weights = vec![0.0; lambda];
    if mu == 0 {
        return weights;
    }
    match recombination {
        Recombination::Equal => {
            for w in weights.iter_mut().take(mu) {
                *w = 1.0 / mu as f64;
            }
        }
        Recombination::Weighted => {
            let top = (mu as f64 + 0.5).ln();
            let raw: Vec<f64> = (1..=mu).map(|i| top - (i as f64).ln()).collect();
            let sum: f64 = raw.iter().sum();
            for (w, r) in weights.iter_mut().zip(raw) {
                *w = r / sum;
            }
        }
    }
    weights
}

/// A ranked population: sampling indices ordered best-first, with weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    order: Vec<usize>,
    weights: Vec<f64>,
}

impl Ranking {
    /// Ranks `population` by fitness (ascending) and assigns utility weights.
    ///
    /// The sort is stable over sampling order, so equal fitness values keep
    /// the order in which they were sampled. Unevaluated individuals rank
    /// last.
    pub fn new(population: &[Individual], utility: &Utility) -> Self {
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| {
            population[a]
                .fitness_or_worst()
                .partial_cmp(&population[b].fitness_or_worst())
                .unwrap_or(Ordering::Equal)
        });
        Self {
            weights: utility.weights(population.len()),
            order,
        }
    }

    /// Population positions, best first.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Weight per rank (index 0 = best).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Population position of the best individual.
    pub fn best(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// `(population position, weight)` pairs, best first.
    pub fn weighted(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.order.iter().copied().zip(self.weights.iter().copied())
    }

    /// Number of ranked individuals.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` for an empty ranking.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
