//! Candidate sampling with box-bound enforcement.
//!
//! Every algorithm draws standard-normal vectors from the run's
//! [`RunContext`] and maps them through its own parameterization
//! (mean plus algorithm-specific spread). The [`Sampler`] owns the part that
//! is shared: the draw itself and keeping the result inside the box.

use crate::population::Individual;
use crate::problem::Bounds;
use crate::random::RunContext;

/// How candidates falling outside the box are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundPolicy {
    /// Clamp each coordinate to `[lo, hi]`.
    #[default]
    Clip,

    /// Redraw the noise vector until the candidate is feasible.
    ///
    /// After `max_attempts` infeasible draws the last one is clipped, so the
    /// evaluated point is always inside the box.
    Resample {
        /// Draws before falling back to clipping (at least 1).
        max_attempts: usize,
    },
}

/// Draws candidates and enforces the bound policy.
#[derive(Debug, Clone)]
pub struct Sampler {
    bounds: Option<Bounds>,
    policy: BoundPolicy,
}

impl Sampler {
    /// Creates a sampler. Without bounds the policy has no effect.
    pub fn new(bounds: Option<Bounds>, policy: BoundPolicy) -> Self {
        Self { bounds, policy }
    }

    /// Box bounds, if any.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Active bound policy.
    pub fn policy(&self) -> BoundPolicy {
        self.policy
    }

    /// Draws `z ~ N(0, I_n)`, maps it through `transform` and enforces bounds.
    ///
    /// Under [`BoundPolicy::Resample`] only `z` is redrawn; anything the
    /// caller drew before (e.g. a step size) stays fixed.
    pub fn draw<T>(
        &self,
        ctx: &mut RunContext,
        index: usize,
        dimension: usize,
        transform: T,
    ) -> Individual
    where
        T: Fn(&[f64]) -> Vec<f64>,
    {
        let mut z = ctx.standard_normal_vec(dimension);
        let mut x = transform(&z);

        if let Some(bounds) = &self.bounds {
            if let BoundPolicy::Resample { max_attempts } = self.policy {
                let mut attempts = 1;
                while !bounds.contains(&x) && attempts < max_attempts.max(1) {
                    z = ctx.standard_normal_vec(dimension);
                    x = transform(&z);
                    attempts += 1;
                }
            }
            bounds.clip(&mut x);
        }

        Individual::new(index, x, z)
    }

    /// Uniform draw over the box; `None` for unbounded problems.
    pub fn uniform(&self, ctx: &mut RunContext, index: usize) -> Option<Individual> {
        self.bounds
            .as_ref()
            .map(|bounds| Individual::new(index, bounds.sample_uniform(ctx.rng()), Vec::new()))
    }

    /// Returns `x` moved into the box (identity without bounds).
    pub fn project(&self, mut x: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = &self.bounds {
            bounds.clip(&mut x);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shifted(mean: f64, sigma: f64) -> impl Fn(&[f64]) -> Vec<f64> {
        move |z: &[f64]| z.iter().map(|v| mean + sigma * v).collect()
    }

    #[test]
    fn test_draw_is_deterministic() {
        let sampler = Sampler::new(None, BoundPolicy::Clip);
        let mut a = RunContext::new(9);
        let mut b = RunContext::new(9);
        for i in 0..10 {
            let x = sampler.draw(&mut a, i, 5, shifted(1.0, 2.0));
            let y = sampler.draw(&mut b, i, 5, shifted(1.0, 2.0));
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_unbounded_draw_keeps_noise_consistent() {
        let sampler = Sampler::new(None, BoundPolicy::Clip);
        let mut ctx = RunContext::new(3);
        let ind = sampler.draw(&mut ctx, 0, 4, shifted(1.0, 0.5));
        for (x, z) in ind.x.iter().zip(ind.noise.iter()) {
            assert!((x - (1.0 + 0.5 * z)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_resample_keeps_noise_consistent_when_feasible() {
        let bounds = Bounds::uniform(2, -1.0, 1.0).unwrap();
        let sampler = Sampler::new(Some(bounds.clone()), BoundPolicy::Resample { max_attempts: 1000 });
        let mut ctx = RunContext::new(11);
        for i in 0..100 {
            let ind = sampler.draw(&mut ctx, i, 2, shifted(0.0, 0.8));
            assert!(bounds.contains(&ind.x));
            for (x, z) in ind.x.iter().zip(ind.noise.iter()) {
                assert!((x - 0.8 * z).abs() < 1e-15, "resampled point should match its noise");
            }
        }
    }

    #[test]
    fn test_uniform_requires_bounds() {
        let mut ctx = RunContext::new(0);
        assert!(Sampler::new(None, BoundPolicy::Clip).uniform(&mut ctx, 0).is_none());
    }

    proptest! {
        #[test]
        fn prop_clip_respects_bounds(seed in any::<u64>(), mean in -50.0f64..50.0, sigma in 0.01f64..100.0) {
            let bounds = Bounds::uniform(6, -2.0, 3.0).unwrap();
            let sampler = Sampler::new(Some(bounds.clone()), BoundPolicy::Clip);
            let mut ctx = RunContext::new(seed);
            for i in 0..8 {
                let ind = sampler.draw(&mut ctx, i, 6, shifted(mean, sigma));
                prop_assert!(bounds.contains(&ind.x));
            }
        }

        #[test]
        fn prop_resample_respects_bounds(seed in any::<u64>(), mean in -50.0f64..50.0, sigma in 0.01f64..100.0) {
            let bounds = Bounds::uniform(6, -2.0, 3.0).unwrap();
            let sampler = Sampler::new(Some(bounds.clone()), BoundPolicy::Resample { max_attempts: 5 });
            let mut ctx = RunContext::new(seed);
            for i in 0..8 {
                let ind = sampler.draw(&mut ctx, i, 6, shifted(mean, sigma));
                prop_assert!(bounds.contains(&ind.x));
            }
        }
    }
}
