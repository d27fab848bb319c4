//! Rank-one NES: full-rank isotropic spread plus one learned direction.

use super::config::R1NesConfig;
use crate::engine::{
    default_lambda, ensure_finite, initial_point, DistributionState, NumericalInstability, Strategy,
};
use crate::error::ConfigError;
use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;
use crate::ranking::{Ranking, Utility};
use crate::sampling::Sampler;

/// Upper limit on the condition number `1 + r²` of `I + u·uᵀ`.
const MAX_CONDITION: f64 = 1e8;

/// Smallest value `c` is allowed to take.
const MIN_SCALE: f64 = f64::MIN_POSITIVE;

/// Distribution `N(m, c·(I + u·uᵀ))` with `u = r·v`, `‖v‖ = 1`.
///
/// Stored in `O(n)`: the covariance matrix is never formed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct R1NesState {
    mean: Vec<f64>,
    direction: Vec<f64>,
    length: f64,
    scale: f64,
}

impl R1NesState {
    /// Unit direction `v` of the rank-one component.
    pub fn direction(&self) -> &[f64] {
        &self.direction
    }

    /// Length `r = ‖u‖` of the rank-one component.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Isotropic variance factor `c`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The rank-one vector `u = r·v`.
    pub fn rank_one_vector(&self) -> Vec<f64> {
        self.direction.iter().map(|v| self.length * v).collect()
    }

    /// Maps a standard-normal draw `s` to `y` with `Cov(y) = I + u·uᵀ`.
    ///
    /// Uses the symmetric square root `I + (√(1 + r²) − 1)·v·vᵀ`.
    fn shape(&self, s: &[f64]) -> Vec<f64> {
        let stretch = (1.0 + self.length * self.length).sqrt() - 1.0;
        let along = dot(&self.direction, s);
        s.iter()
            .zip(&self.direction)
            .map(|(si, vi)| si + stretch * along * vi)
            .collect()
    }
}

impl DistributionState for R1NesState {
    fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// `√c`: the standard deviation orthogonal to `u`, which is also the
    /// smallest standard deviation of the distribution.
    fn spread(&self) -> Option<f64> {
        Some(self.scale.sqrt())
    }
}

/// Rank-one Natural Evolution Strategy.
///
/// The natural gradient is estimated in local coordinates `s` (where
/// `x = m + √c·A·s`) and projected onto the three degrees of freedom the
/// family has:
///
/// - isotropic scale: `ln c += η_c · Σwᵢ(‖sᵢ‖² − n) / n`
/// - stretch along `v`: `ln(1 + r²) += η_c · (Σwᵢ(aᵢ² − 1) − Σwᵢ(‖sᵢ‖² − n) / n)`
/// - rotation of `v`: `v ← normalize(v + η_u·ρ·(G·v − (vᵀG·v)·v))`
///
/// where `aᵢ = v·sᵢ`, `G = Σwᵢ(sᵢsᵢᵀ − I)` and `ρ = √(1 + r²) / max(r², 1)`.
/// `ρ` is the first-order motion of the leading eigenvector of
/// `A·(I + ηG)·A` relative to that of `I + ηG`. `G·v` is computed as
/// `Σwᵢaᵢsᵢ − (Σwᵢ)v` without forming `G`.
#[derive(Debug, Clone, Default)]
pub struct R1Nes {
    config: R1NesConfig,
}

impl R1Nes {
    /// Creates the algorithm from its configuration.
    pub fn new(config: R1NesConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &R1NesConfig {
        &self.config
    }
}

impl Strategy for R1Nes {
    type State = R1NesState;

    fn name(&self) -> &'static str {
        "r1nes"
    }

    fn default_population_size(&self, dimension: usize) -> usize {
        default_lambda(dimension)
    }

    fn validate(
        &self,
        dimension: usize,
        _population_size: usize,
        _bounds: Option<&Bounds>,
    ) -> Result<(), ConfigError> {
        self.config.validate(dimension)
    }

    fn utility(&self, _population_size: usize) -> Utility {
        Utility::Nes
    }

    fn initialize(&self, dimension: usize, sampler: &Sampler, ctx: &mut RunContext) -> R1NesState {
        let mean = initial_point(self.config.initial_mean.as_deref(), dimension, sampler, ctx);
        let (direction, length) = match self.config.initial_direction.as_deref() {
            Some(u) => {
                let norm = dot(u, u).sqrt();
                if norm > 0.0 {
                    let length = norm.min((MAX_CONDITION - 1.0).sqrt());
                    (u.iter().map(|x| x / norm).collect(), length)
                } else {
                    (ctx.unit_vector(dimension), 0.0)
                }
            }
            None => (ctx.unit_vector(dimension), 0.0),
        };

        R1NesState {
            mean,
            direction,
            length,
            scale: self.config.initial_spread * self.config.initial_spread,
        }
    }

    fn sample(
        &self,
        state: &R1NesState,
        lambda: usize,
        sampler: &Sampler,
        ctx: &mut RunContext,
    ) -> Vec<Individual> {
        let n = state.mean.len();
        let sigma = state.scale.sqrt();
        (0..lambda)
            .map(|i| {
                sampler.draw(ctx, i, n, |s| {
                    state
                        .shape(s)
                        .iter()
                        .zip(&state.mean)
                        .map(|(y, m)| m + sigma * y)
                        .collect()
                })
            })
            .collect()
    }

    fn update(
        &self,
        state: &mut R1NesState,
        population: &[Individual],
        ranking: &Ranking,
    ) -> Result<(), NumericalInstability> {
        let n = state.mean.len();
        let nf = n as f64;
        let eta_m = self.config.mean_rate();
        let eta_c = self.config.covariance_rate(n);
        let eta_u = self.config.direction_rate(n);

        let mut grad_mean = vec![0.0; n];
        let mut g_v = vec![0.0; n];
        let mut g_trace = 0.0;
        let mut g_along = 0.0;
        let mut weight_sum = 0.0;
        for (pos, w) in ranking.weighted() {
            let s = &population[pos].noise;
            let y = state.shape(s);
            let a = dot(&state.direction, s);
            for j in 0..n {
                grad_mean[j] += w * y[j];
                g_v[j] += w * a * s[j];
            }
            g_trace += w * (dot(s, s) - nf);
            g_along += w * (a * a - 1.0);
            weight_sum += w;
        }

        let sigma = state.scale.sqrt();
        let mean: Vec<f64> = state
            .mean
            .iter()
            .zip(&grad_mean)
            .map(|(m, g)| m + eta_m * sigma * g)
            .collect();
        ensure_finite("mean", &mean)?;

        let scale = (state.scale.ln() + eta_c * g_trace / nf).exp().max(MIN_SCALE);
        if !scale.is_finite() {
            return Err(NumericalInstability { parameter: "scale" });
        }

        let stretch = (1.0 + state.length * state.length).ln() + eta_c * (g_along - g_trace / nf);
        if !stretch.is_finite() {
            return Err(NumericalInstability {
                parameter: "rank-one length",
            });
        }
        let length = stretch.clamp(0.0, MAX_CONDITION.ln()).exp_m1().sqrt();

        // Rotation: component of G·v orthogonal to v, damped by the eigen-gap.
        let r2 = state.length * state.length;
        let turn = eta_u * (1.0 + r2).sqrt() / r2.max(1.0);
        let rotated: Vec<f64> = state
            .direction
            .iter()
            .zip(&g_v)
            .map(|(v, gv)| v + turn * (gv - weight_sum * v - (g_along * v)))
            .collect();
        let norm = dot(&rotated, &rotated).sqrt();
        let direction = if norm.is_finite() && norm > 0.0 {
            rotated.into_iter().map(|x| x / norm).collect()
        } else {
            state.direction.clone()
        };

        state.mean = mean;
        state.scale = scale;
        state.length = length;
        state.direction = direction;
        Ok(())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Optimizer, RunConfig};
    use crate::nes::{Snes, SnesConfig};
    use crate::problem::Problem;
    use crate::sampling::BoundPolicy;
    use crate::termination::TerminationReason;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn norm(v: &[f64]) -> f64 {
        dot(v, v).sqrt()
    }

    #[test]
    fn test_sphere_converges() {
        let problem = Problem::new(sphere, 5).unwrap();
        let strategy = R1Nes::new(R1NesConfig::default().with_initial_mean(vec![1.0; 5]));
        let config = RunConfig::default()
            .with_max_generations(2_000)
            .with_fitness_threshold(1e-4);
        let result = Optimizer::new(problem, strategy, config).unwrap().run().unwrap();
        assert!(
            result.best_fitness < 1e-4,
            "R1NES should solve the 5-d sphere, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_direction_stays_unit_length() {
        let problem = Problem::new(|x: &[f64]| (x[0] - 3.0 * x[1]).powi(2) + 0.01 * sphere(x), 3).unwrap();
        let optimizer = Optimizer::new(
            problem,
            R1Nes::new(R1NesConfig::default().with_initial_mean(vec![2.0, -1.0, 0.5])),
            RunConfig::default().with_max_generations(200),
        )
        .unwrap();
        let mut state = optimizer.initialize(11);
        while !optimizer.should_stop(&state) {
            optimizer.step(&mut state).unwrap();
            let dist = state.distribution();
            assert!((norm(dist.direction()) - 1.0).abs() < 1e-9);
            assert!(dist.scale() > 0.0);
            assert!(dist.length() >= 0.0);
            assert_eq!(dist.mean().len(), 3);
        }
    }

    /// Steep (`k = 100`) everywhere except along `1/√n`.
    fn long_axis(x: &[f64]) -> f64 {
        let along = x.iter().sum::<f64>() / (x.len() as f64).sqrt();
        100.0 * (sphere(x) - along * along) + along * along
    }

    #[test]
    fn test_learns_long_axis() {
        let n = 10;
        let start: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -0.5 }).collect();
        let problem = Problem::new(long_axis, n).unwrap();
        let config = RunConfig::default()
            .with_max_generations(1_500)
            .with_fitness_threshold(1e-8)
            .with_min_spread(0.0)
            .with_seed(1);

        let optimizer = Optimizer::new(
            problem.clone(),
            R1Nes::new(R1NesConfig::default().with_initial_mean(start.clone())),
            config.clone(),
        )
        .unwrap();
        let mut state = optimizer.initialize(1);
        while !optimizer.should_stop(&state) {
            optimizer.step(&mut state).unwrap();
        }
        let dist = state.distribution();
        let alignment = dist.direction().iter().sum::<f64>().abs() / (n as f64).sqrt();
        let best = state.best().unwrap().fitness;
        assert_eq!(state.termination(), Some(TerminationReason::FitnessThreshold));
        assert!(best <= 1e-8, "R1NES best {best}");
        assert!(alignment > 0.9, "direction not on the long axis: {alignment}");
        assert!(dist.length() > 1.0, "rank-one component not elongated: {}", dist.length());

        let separable = Optimizer::new(
            problem,
            Snes::new(SnesConfig::default().with_initial_mean(start)),
            config,
        )
        .unwrap()
        .run()
        .unwrap();
        assert!(
            separable.generations > state.generation(),
            "SNES {} generations vs R1NES {}",
            separable.generations,
            state.generation()
        );
    }

    #[test]
    fn test_shape_has_rank_one_covariance() {
        let state = R1NesState {
            mean: vec![0.0; 2],
            direction: vec![1.0, 0.0],
            length: 3.0,
            scale: 1.0,
        };
        // Along v the standard deviation is √(1 + r²); orthogonal to it, 1.
        assert!((state.shape(&[1.0, 0.0])[0] - 10f64.sqrt()).abs() < 1e-12);
        assert_eq!(state.shape(&[0.0, 1.0]), vec![0.0, 1.0]);
        assert_eq!(state.rank_one_vector(), vec![3.0, 0.0]);
    }

    #[test]
    fn test_initial_direction_is_normalized() {
        let strategy = R1Nes::new(
            R1NesConfig::default()
                .with_initial_direction(vec![3.0, 4.0])
                .with_initial_spread(0.5),
        );
        let sampler = Sampler::new(None, BoundPolicy::Clip);
        let state = strategy.initialize(2, &sampler, &mut RunContext::new(0));
        assert_eq!(state.length(), 5.0);
        assert!((state.direction()[0] - 0.6).abs() < 1e-12);
        assert_eq!(state.scale(), 0.25);
        assert_eq!(state.spread(), Some(0.5));
    }

    #[test]
    fn test_random_direction_without_configuration() {
        let strategy = R1Nes::default();
        let sampler = Sampler::new(None, BoundPolicy::Clip);
        let a = strategy.initialize(4, &sampler, &mut RunContext::new(8));
        let b = strategy.initialize(4, &sampler, &mut RunContext::new(8));
        assert_eq!(a, b, "initial direction must come from the run's stream");
        assert_eq!(a.length(), 0.0);
        assert!((norm(a.direction()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_population_of_one_runs() {
        let problem = Problem::new(sphere, 2).unwrap();
        let config = RunConfig::default()
            .with_population_size(1)
            .with_max_generations(5);
        let result = Optimizer::new(problem, R1Nes::default(), config)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.generations, 5);
        assert_eq!(result.final_spread, Some(1.0));
    }
}
