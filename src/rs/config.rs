//! Random-search configurations.

use crate::engine::{check_dimension, check_spread};
use crate::error::ConfigError;
use crate::problem::Bounds;

/// Configuration for pure random search.
///
/// The search space is the problem's box; there is nothing else to set.
/// Bounds are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrsConfig {}

impl PrsConfig {
    /// Fails unless the problem declares box bounds.
    pub fn validate(&self, bounds: Option<&Bounds>) -> Result<(), ConfigError> {
        match bounds {
            Some(_) => Ok(()),
            None => Err(ConfigError::MissingBounds { algorithm: "prs" }),
        }
    }
}

/// Configuration for the random hill climber.
///
/// # Examples
///
/// ```
/// use u_evostrat::rs::RhcConfig;
///
/// let config = RhcConfig::default()
///     .with_initial_mean(vec![0.0, 1.0])
///     .with_step_size(0.05);
/// assert!(config.validate(2).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RhcConfig {
    /// Starting point. `None` draws it uniformly from the bounds, or uses
    /// the origin for unbounded problems.
    pub initial_mean: Option<Vec<f64>>,

    /// Fixed perturbation scale `σ`.
    pub step_size: f64,
}

impl Default for RhcConfig {
    fn default() -> Self {
        Self {
            initial_mean: None,
            step_size: 0.1,
        }
    }
}

impl RhcConfig {
    /// Sets the starting point.
    pub fn with_initial_mean(mut self, mean: Vec<f64>) -> Self {
        self.initial_mean = Some(mean);
        self
    }

    /// Sets the perturbation scale.
    pub fn with_step_size(mut self, sigma: f64) -> Self {
        self.step_size = sigma;
        self
    }

    /// Validates the configuration against a problem dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        check_dimension("initial_mean", self.initial_mean.as_deref(), dimension)?;
        check_spread(self.step_size)
    }
}

/// Configuration for the annealed random hill climber.
///
/// The perturbation scale follows `σ_{g+1} = max(floor, decay · σ_g)`
/// regardless of acceptance.
///
/// # Examples
///
/// ```
/// use u_evostrat::rs::ArhcConfig;
///
/// let config = ArhcConfig::default()
///     .with_initial_step_size(2.0)
///     .with_decay_rate(0.95)
///     .with_floor(1e-4);
/// assert!(config.validate(3).is_ok());
/// assert!(config.clone().with_decay_rate(1.5).validate(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArhcConfig {
    /// Starting point (see [`RhcConfig::initial_mean`]).
    pub initial_mean: Option<Vec<f64>>,

    /// Starting perturbation scale `σ₀`.
    pub initial_step_size: f64,

    /// Multiplicative decay per generation, in `(0, 1]`.
    pub decay_rate: f64,

    /// Lower limit of the perturbation scale, in `(0, σ₀]`.
    pub floor: f64,
}

impl Default for ArhcConfig {
    fn default() -> Self {
        Self {
            initial_mean: None,
            initial_step_size: 1.0,
            decay_rate: 0.99,
            floor: 1e-8,
        }
    }
}

impl ArhcConfig {
    /// Sets the starting point.
    pub fn with_initial_mean(mut self, mean: Vec<f64>) -> Self {
        self.initial_mean = Some(mean);
        self
    }

    /// Sets `σ₀`.
    pub fn with_initial_step_size(mut self, sigma: f64) -> Self {
        self.initial_step_size = sigma;
        self
    }

    /// Sets the decay factor.
    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Sets the scale floor.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Validates the configuration against a problem dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        check_dimension("initial_mean", self.initial_mean.as_deref(), dimension)?;
        check_spread(self.initial_step_size)?;
        if !(self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(ConfigError::InvalidDecay {
                rate: self.decay_rate,
            });
        }
        if !(self.floor > 0.0 && self.floor <= self.initial_step_size) {
            return Err(ConfigError::InvalidFloor {
                floor: self.floor,
                initial: self.initial_step_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prs_needs_bounds() {
        let err = PrsConfig::default().validate(None).unwrap_err();
        assert_eq!(err, ConfigError::MissingBounds { algorithm: "prs" });
        assert!(err.is_bounds_error());

        let bounds = Bounds::uniform(2, -1.0, 1.0).unwrap();
        assert!(PrsConfig::default().validate(Some(&bounds)).is_ok());
    }

    #[test]
    fn test_rhc_validation() {
        assert!(RhcConfig::default().validate(3).is_ok());
        assert!(RhcConfig::default().with_step_size(0.0).validate(3).is_err());
        assert!(RhcConfig::default()
            .with_initial_mean(vec![0.0])
            .validate(3)
            .is_err());
    }

    #[test]
    fn test_arhc_validation() {
        assert!(ArhcConfig::default().validate(2).is_ok());
        assert!(ArhcConfig::default().with_decay_rate(1.0).validate(2).is_ok());

        let err = ArhcConfig::default().with_decay_rate(0.0).validate(2).unwrap_err();
        assert_eq!(err, ConfigError::InvalidDecay { rate: 0.0 });

        let err = ArhcConfig::default().with_floor(2.0).validate(2).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidFloor {
                floor: 2.0,
                initial: 1.0
            }
        );
        assert!(ArhcConfig::default().with_floor(-1e-3).validate(2).is_err());
    }
}
