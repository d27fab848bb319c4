//! Best-so-far tracking and per-generation records.

/// Best decision vector observed during a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestSolution {
    /// Decision vector.
    pub x: Vec<f64>,
    /// Its fitness.
    pub fitness: f64,
    /// 1-based evaluation index at which it was found.
    pub evaluation: usize,
}

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    /// 1-based generation number.
    pub generation: usize,
    /// Evaluations consumed up to and including this generation.
    pub evaluations: usize,
    /// Best fitness over the whole run so far.
    pub best_so_far: f64,
    /// Best fitness within this generation.
    pub generation_best: f64,
    /// Mean fitness within this generation.
    pub generation_mean: f64,
    /// Spread parameter after this generation's update.
    pub spread: Option<f64>,
}

/// Lazy, restartable view over generation records.
///
/// Each call to `records()` on the owner starts over from the first record.
/// A clone continues from the position of the iterator it was cloned from.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    inner: std::slice::Iter<'a, GenerationRecord>,
}

impl<'a> Records<'a> {
    pub(crate) fn new(records: &'a [GenerationRecord]) -> Self {
        Self {
            inner: records.iter(),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a GenerationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Records<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Records<'_> {}

/// Owns the best solution and the generation history of a run.
///
/// The best solution is updated on every evaluation and never regresses;
/// records are appended once per generation.
#[derive(Debug, Clone)]
pub struct Recorder {
    best: Option<BestSolution>,
    records: Vec<GenerationRecord>,
    pending: Option<GenerationRecord>,
    interval: usize,
}

impl Recorder {
    /// Creates a recorder keeping every `interval`-th generation record
    /// (the most recent one is always available).
    pub fn new(interval: usize) -> Self {
        Self {
            best: None,
            records: Vec::new(),
            pending: None,
            interval: interval.max(1),
        }
    }

    /// Offers an evaluated point. Returns `true` if it became the new best.
    ///
    /// Replacement requires strictly lower fitness.
    pub fn observe(&mut self, x: &[f64], fitness: f64, evaluation: usize) -> bool {
        let improved = self.best.as_ref().is_none_or(|best| fitness < best.fitness);
        if improved {
            self.best = Some(BestSolution {
                x: x.to_vec(),
                fitness,
                evaluation,
            });
        }
        improved
    }

    /// Best solution so far.
    pub fn best(&self) -> Option<&BestSolution> {
        self.best.as_ref()
    }

    /// Best fitness so far (`+inf` before any evaluation).
    pub fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.fitness)
    }

    /// Appends the record of a completed generation.
    pub fn close_generation(&mut self, record: GenerationRecord) {
        if record.generation % self.interval == 0 {
            self.records.push(record);
            self.pending = None;
        } else {
            self.pending = Some(record);
        }
    }

    /// Most recent generation record, kept or not.
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.pending.as_ref().or_else(|| self.records.last())
    }

    /// Iterates the kept records.
    pub fn records(&self) -> Records<'_> {
        Records::new(&self.records)
    }

    /// Consumes the recorder, returning the best solution and the kept
    /// records with the most recent generation appended if it was skipped.
    pub fn into_parts(mut self) -> (Option<BestSolution>, Vec<GenerationRecord>) {
        if let Some(last) = self.pending.take() {
            self.records.push(last);
        }
        (self.best, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: usize, best_so_far: f64) -> GenerationRecord {
        GenerationRecord {
            generation,
            evaluations: generation * 4,
            best_so_far,
            generation_best: best_so_far,
            generation_mean: best_so_far + 1.0,
            spread: Some(1.0),
        }
    }

    #[test]
    fn test_best_never_regresses() {
        let mut rec = Recorder::new(1);
        assert!(rec.observe(&[1.0], 5.0, 1));
        assert!(!rec.observe(&[2.0], 6.0, 2));
        assert!(!rec.observe(&[3.0], 5.0, 3), "equal fitness must not replace");
        assert!(rec.observe(&[4.0], 1.0, 4));
        let best = rec.best().unwrap();
        assert_eq!(best.x, vec![4.0]);
        assert_eq!(best.evaluation, 4);
    }

    #[test]
    fn test_records_are_restartable() {
        let mut rec = Recorder::new(1);
        for g in 1..=3 {
            rec.close_generation(record(g, 10.0 - g as f64));
        }
        let first: Vec<usize> = rec.records().map(|r| r.generation).collect();
        let again: Vec<usize> = rec.records().map(|r| r.generation).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, again);

        let mut it = rec.records();
        it.next();
        let copy = it.clone();
        assert_eq!(it.count(), 2);
        assert_eq!(copy.map(|r| r.generation).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(rec.records().len(), 3);
    }

    #[test]
    fn test_interval_keeps_last_generation() {
        let mut rec = Recorder::new(3);
        for g in 1..=7 {
            rec.close_generation(record(g, 1.0));
        }
        assert_eq!(rec.last().map(|r| r.generation), Some(7));
        let kept: Vec<usize> = rec.records().map(|r| r.generation).collect();
        assert_eq!(kept, vec![3, 6]);

        let (_, records) = rec.into_parts();
        let all: Vec<usize> = records.iter().map(|r| r.generation).collect();
        assert_eq!(all, vec![3, 6, 7]);
    }
}
