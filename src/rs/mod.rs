//! Random Search (RS).
//!
//! Minimal-adaptation baselines:
//!
//! - [`Prs`]: pure random search, uniform over the box.
//! - [`RandomHillClimber`]: Gaussian neighbours, greedy acceptance.
//! - [`AnnealedHillClimber`]: as above with a decaying neighbourhood scale.
//!
//! All three default to one candidate per generation.
//!
//! # References
//!
//! - Brooks (1958), "A Discussion of Random Methods for Seeking Maxima"
//! - Rastrigin (1963), "The Convergence of the Random Search Method in the
//!   External Control of Many-Parameter Systems"
//! - Solis & Wets (1981), "Minimization by Random Search Techniques"

mod config;
mod prs;
mod rhc;

pub use config::{ArhcConfig, PrsConfig, RhcConfig};
pub use prs::{Prs, PrsState};
pub use rhc::{AnnealedHillClimber, ClimberState, RandomHillClimber};
