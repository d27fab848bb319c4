//! Candidate solutions and per-generation population statistics.

/// One sampled candidate.
///
/// `noise` is the standard-normal vector the candidate was generated from
/// (empty for uniform draws); gradient-style updates read it instead of
/// reconstructing it from `x`. `step_size` is the private strategy parameter
/// of self-adaptive evolution strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Position in the population, in sampling order.
    pub index: usize,
    /// Decision vector that is evaluated.
    pub x: Vec<f64>,
    /// Standard-normal draw behind `x`.
    pub noise: Vec<f64>,
    /// Self-adapted step size, if the algorithm carries one.
    pub step_size: Option<f64>,
    /// Objective value; `None` until evaluated.
    pub fitness: Option<f64>,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(index: usize, x: Vec<f64>, noise: Vec<f64>) -> Self {
        Self {
            index,
            x,
            noise,
            step_size: None,
            fitness: None,
        }
    }

    /// Attaches a self-adapted step size.
    pub fn with_step_size(mut self, sigma: f64) -> Self {
        self.step_size = Some(sigma);
        self
    }

    /// Fitness, treating unevaluated individuals as worst possible.
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }
}

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Lowest fitness in the generation.
    pub best: f64,
    /// Arithmetic mean fitness.
    pub mean: f64,
    /// `max - min`; infinite if any fitness is non-finite.
    pub range: f64,
    /// Number of evaluated individuals.
    pub size: usize,
}

impl PopulationStats {
    /// Computes statistics over a population. Returns `None` when empty.
    pub fn of(population: &[Individual]) -> Option<Self> {
        if population.is_empty() {
            return None;
        }
        let mut best = f64::INFINITY;
        let mut worst = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for ind in population {
            let f = ind.fitness_or_worst();
            best = best.min(f);
            worst = worst.max(f);
            sum += f;
        }
        let range = if best.is_finite() && worst.is_finite() {
            worst - best
        } else {
            f64::INFINITY
        };
        Some(Self {
            best,
            mean: sum / population.len() as f64,
            range,
            size: population.len(),
        })
    }
}
