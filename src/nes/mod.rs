//! Natural Evolution Strategies (NES).
//!
//! Search-distribution methods that follow the natural gradient of the
//! expected (rank-shaped) fitness. Both variants here keep the per-generation
//! cost linear in the dimension:
//!
//! - [`Snes`]: separable NES with one scale per coordinate.
//! - [`R1Nes`]: rank-one NES, `c·(I + u·uᵀ)` covariance, able to follow a
//!   single correlated direction.
//!
//! # References
//!
//! - Wierstra, Schaul, Glasmachers, Sun, Peters & Schmidhuber (2014),
//!   "Natural Evolution Strategies", JMLR 15
//! - Schaul, Glasmachers & Schmidhuber (2011), "High Dimensions and Heavy
//!   Tails for Natural Evolution Strategies"
//! - Sun, Schaul, Gomez & Schmidhuber (2013), "A Linear Time Natural
//!   Evolution Strategy for Non-Separable Functions"

mod config;
mod r1nes;
mod snes;

pub use config::{R1NesConfig, SnesConfig};
pub use r1nes::{R1Nes, R1NesState};
pub use snes::{Snes, SnesState};
