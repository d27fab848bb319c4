//! NES configuration.

use crate::engine::{check_dimension, check_learning_rate, check_spread};
use crate::error::ConfigError;

/// `(3 + ln n) / (5 √n)`, the separable-NES default for spread learning rates.
pub(crate) fn default_spread_rate(dimension: usize) -> f64 {
    let n = dimension.max(1) as f64;
    (3.0 + n.ln()) / (5.0 * n.sqrt())
}

/// Configuration for the separable NES.
///
/// # Examples
///
/// ```
/// use u_evostrat::nes::SnesConfig;
///
/// let config = SnesConfig::default()
///     .with_initial_mean(vec![0.5; 3])
///     .with_initial_scale(2.0)
///     .with_scale_learning_rate(0.2);
/// assert!(config.validate(3).is_ok());
/// assert_eq!(config.mean_rate(), 1.0);
/// assert_eq!(config.scale_rate(3), 0.2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnesConfig {
    /// Starting mean. `None` draws it uniformly from the bounds, or uses the
    /// origin for unbounded problems.
    pub initial_mean: Option<Vec<f64>>,

    /// Starting scale shared by every coordinate.
    pub initial_scale: f64,

    /// Per-coordinate starting scales; overrides `initial_scale`.
    pub initial_scales: Option<Vec<f64>>,

    /// Mean learning rate `η_m`. Default: 1.
    pub mean_learning_rate: Option<f64>,

    /// Scale learning rate `η_s`. Default: `(3 + ln n) / (5 √n)`.
    pub scale_learning_rate: Option<f64>,
}

impl Default for SnesConfig {
    fn default() -> Self {
        Self {
            initial_mean: None,
            initial_scale: 1.0,
            initial_scales: None,
            mean_learning_rate: None,
            scale_learning_rate: None,
        }
    }
}

impl SnesConfig {
    /// Sets the starting mean.
    pub fn with_initial_mean(mut self, mean: Vec<f64>) -> Self {
        self.initial_mean = Some(mean);
        self
    }

    /// Sets one starting scale for every coordinate.
    pub fn with_initial_scale(mut self, scale: f64) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Sets per-coordinate starting scales.
    pub fn with_initial_scales(mut self, scales: Vec<f64>) -> Self {
        self.initial_scales = Some(scales);
        self
    }

    /// Overrides `η_m`.
    pub fn with_mean_learning_rate(mut self, rate: f64) -> Self {
        self.mean_learning_rate = Some(rate);
        self
    }

    /// Overrides `η_s`.
    pub fn with_scale_learning_rate(mut self, rate: f64) -> Self {
        self.scale_learning_rate = Some(rate);
        self
    }

    /// Effective `η_m`.
    pub fn mean_rate(&self) -> f64 {
        self.mean_learning_rate.unwrap_or(1.0)
    }

    /// Effective `η_s` for a problem of the given dimension.
    pub fn scale_rate(&self, dimension: usize) -> f64 {
        self.scale_learning_rate
            .unwrap_or_else(|| default_spread_rate(dimension))
    }

    /// Starting scale vector.
    pub(crate) fn scales(&self, dimension: usize) -> Vec<f64> {
        self.initial_scales
            .clone()
            .unwrap_or_else(|| vec![self.initial_scale; dimension])
    }

    /// Validates the configuration against a problem dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        check_dimension("initial_mean", self.initial_mean.as_deref(), dimension)?;
        check_dimension("initial_scales", self.initial_scales.as_deref(), dimension)?;
        match &self.initial_scales {
            Some(scales) => scales.iter().try_for_each(|&s| check_spread(s))?,
            None => check_spread(self.initial_scale)?,
        }
        check_learning_rate("mean_learning_rate", self.mean_learning_rate)?;
        check_learning_rate("scale_learning_rate", self.scale_learning_rate)?;
        Ok(())
    }
}

/// Configuration for the rank-one NES.
///
/// The search distribution is `N(m, c·(I + u·uᵀ))`. `initial_spread` is
/// `√c`, the standard deviation in every direction orthogonal to `u`.
///
/// # Examples
///
/// ```
/// use u_evostrat::nes::R1NesConfig;
///
/// let config = R1NesConfig::default()
///     .with_initial_spread(0.5)
///     .with_initial_direction(vec![1.0, 0.0]);
/// assert!(config.validate(2).is_ok());
/// assert!(config.validate(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct R1NesConfig {
    /// Starting mean (see [`SnesConfig::initial_mean`]).
    pub initial_mean: Option<Vec<f64>>,

    /// Starting `√c`.
    pub initial_spread: f64,

    /// Starting rank-one vector `u`. `None` starts isotropic (`u = 0`) with a
    /// random unit direction.
    pub initial_direction: Option<Vec<f64>>,

    /// Mean learning rate `η_m`. Default: 1.
    pub mean_learning_rate: Option<f64>,

    /// Learning rate `η_c` for the scale and the length of `u`.
    /// Default: `(3 + ln n) / (5 √n)`.
    pub covariance_learning_rate: Option<f64>,

    /// Learning rate `η_u` for the direction of `u`. Default: `η_c`.
    pub direction_learning_rate: Option<f64>,
}

impl Default for R1NesConfig {
    fn default() -> Self {
        Self {
            initial_mean: None,
            initial_spread: 1.0,
            initial_direction: None,
            mean_learning_rate: None,
            covariance_learning_rate: None,
            direction_learning_rate: None,
        }
    }
}

impl R1NesConfig {
    /// Sets the starting mean.
    pub fn with_initial_mean(mut self, mean: Vec<f64>) -> Self {
        self.initial_mean = Some(mean);
        self
    }

    /// Sets the starting `√c`.
    pub fn with_initial_spread(mut self, spread: f64) -> Self {
        self.initial_spread = spread;
        self
    }

    /// Sets the starting rank-one vector `u`.
    pub fn with_initial_direction(mut self, u: Vec<f64>) -> Self {
        self.initial_direction = Some(u);
        self
    }

    /// Overrides `η_m`.
    pub fn with_mean_learning_rate(mut self, rate: f64) -> Self {
        self.mean_learning_rate = Some(rate);
        self
    }

    /// Overrides `η_c`.
    pub fn with_covariance_learning_rate(mut self, rate: f64) -> Self {
        self.covariance_learning_rate = Some(rate);
        self
    }

    /// Overrides `η_u`.
    pub fn with_direction_learning_rate(mut self, rate: f64) -> Self {
        self.direction_learning_rate = Some(rate);
        self
    }

    /// Effective `η_m`.
    pub fn mean_rate(&self) -> f64 {
        self.mean_learning_rate.unwrap_or(1.0)
    }

    /// Effective `η_c`.
    pub fn covariance_rate(&self, dimension: usize) -> f64 {
        self.covariance_learning_rate
            .unwrap_or_else(|| default_spread_rate(dimension))
    }

    /// Effective `η_u`.
    pub fn direction_rate(&self, dimension: usize) -> f64 {
        self.direction_learning_rate
            .unwrap_or_else(|| self.covariance_rate(dimension))
    }

    /// Validates the configuration against a problem dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigError> {
        check_dimension("initial_mean", self.initial_mean.as_deref(), dimension)?;
        check_dimension("initial_direction", self.initial_direction.as_deref(), dimension)?;
        check_spread(self.initial_spread)?;
        check_learning_rate("mean_learning_rate", self.mean_learning_rate)?;
        check_learning_rate("covariance_learning_rate", self.covariance_learning_rate)?;
        check_learning_rate("direction_learning_rate", self.direction_learning_rate)?;
        Ok(())
    }
}
