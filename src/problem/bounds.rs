//! Per-coordinate box bounds.

use crate::error::ConfigError;
use rand::Rng;

/// Inclusive per-coordinate box `[lower_i, upper_i]`.
///
/// # Examples
///
/// ```
/// use u_evostrat::problem::Bounds;
///
/// let bounds = Bounds::uniform(3, -1.0, 1.0).unwrap();
/// assert!(bounds.contains(&[0.0, -1.0, 1.0]));
/// assert!(!bounds.contains(&[0.0, -1.5, 1.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from explicit lower/upper vectors.
    ///
    /// Fails when the lengths differ, a value is not finite, or
    /// `lower[i] > upper[i]`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, ConfigError> {
        if lower.len() != upper.len() || lower.is_empty() {
            return Err(ConfigError::BoundsMismatch {
                lower_len: lower.len(),
                upper_len: upper.len(),
                dimension: lower.len().max(upper.len()),
            });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(ConfigError::NonFiniteBounds { index });
            }
            if lo > hi {
                return Err(ConfigError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Same `[lower, upper]` interval on every coordinate.
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns `true` if every coordinate lies within its bounds (inclusive).
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.lower.len()
            && x
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
    }

    /// Clamps `x` into the box in place.
    ///
    /// NaN coordinates are replaced with the interval midpoint so the result
    /// always satisfies [`contains`](Self::contains).
    pub fn clip(&self, x: &mut [f64]) {
        for ((v, &lo), &hi) in x.iter_mut().zip(self.lower.iter()).zip(self.upper.iter()) {
            *v = if v.is_nan() {
                midpoint(lo, hi)
            } else {
                v.clamp(lo, hi)
            };
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| midpoint(lo, hi))
            .collect()
    }

    /// Draws a point uniformly from the box.
    ///
    /// Works for any finite box, including ones whose width `hi − lo`
    /// overflows `f64`.
    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| {
                let u: f64 = rng.random();
                (lo + u * hi - u * lo).clamp(lo, hi)
            })
            .collect()
    }
}

fn midpoint(lo: f64, hi: f64) -> f64 {
    0.5 * lo + 0.5 * hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_rejects_inverted_interval() {
        let err = Bounds::new(vec![0.0, 2.0], vec![1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBounds {
                index: 1,
                lower: 2.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Bounds::new(vec![0.0], vec![1.0, 1.0]).unwrap_err();
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let err = Bounds::new(vec![f64::NEG_INFINITY], vec![1.0]).unwrap_err();
        assert_eq!(err, ConfigError::NonFiniteBounds { index: 0 });
    }

    #[test]
    fn test_degenerate_interval_is_allowed() {
        let bounds = Bounds::new(vec![1.0], vec![1.0]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(bounds.sample_uniform(&mut rng), vec![1.0]);
    }

    #[test]
    fn test_clip_handles_nan_and_infinities() {
        let bounds = Bounds::uniform(3, -1.0, 3.0).unwrap();
        let mut x = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        bounds.clip(&mut x);
        assert_eq!(x, [1.0, 3.0, -1.0]);
        assert!(bounds.contains(&x));
    }

    #[test]
    fn test_widest_finite_box_is_usable() {
        let bounds = Bounds::new(vec![-f64::MAX, 1e308], vec![f64::MAX, f64::MAX]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = bounds.sample_uniform(&mut rng);
            assert!(bounds.contains(&x), "sample {x:?} escaped the box");
        }
        let center = bounds.center();
        assert_eq!(center[0], 0.0);
        assert!(center[1].is_finite() && bounds.contains(&center));

        let mut x = [f64::NAN, f64::NAN];
        bounds.clip(&mut x);
        assert!(bounds.contains(&x));
    }

    #[test]
    fn test_uniform_samples_stay_inside() {
        let bounds = Bounds::new(vec![-2.0, 0.0, 10.0], vec![-1.0, 0.5, 11.0]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let x = bounds.sample_uniform(&mut rng);
            assert!(bounds.contains(&x), "sample {x:?} escaped the box");
        }
    }
}
