//! Evolution Strategies (ES).
//!
//! [`SaEs`] is the `(μ/μ_I, λ)-σSA-ES`: comma selection, intermediate
//! recombination of the `μ` best offspring, and a global step size that is
//! mutated along with every offspring (self-adaptation) instead of being
//! controlled by an explicit rule.
//!
//! # References
//!
//! - Rechenberg (1973), "Evolutionsstrategie"
//! - Schwefel (1981), "Numerical Optimization of Computer Models"
//! - Beyer & Schwefel (2002), "Evolution Strategies: A Comprehensive
//!   Introduction", Natural Computing 1

mod config;
mod saes;

pub use config::SaEsConfig;
pub use saes::{SaEs, SaEsState};
