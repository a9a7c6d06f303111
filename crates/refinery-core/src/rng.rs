//! Injectable randomness (§9 design notes: "Randomness must come from an
//! injectable source so tests are deterministic").

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A source of the two random decisions the standard-mode scheduler makes:
/// the berth inter-arrival gap, and the cargo type pick among enabled types.
pub trait RandomSource: Send {
    /// A uniform value in `[min, max]`. Callers pass `min == max` for a fixed gap.
    fn uniform_range(&mut self, min: f64, max: f64) -> f64;

    /// Pick one index in `0..len` uniformly at random. `len` is always > 0.
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Default randomness: a `StdRng` seeded deterministically from a config hash,
/// so a run with the same config and seed always produces the same schedule.
pub struct StdRandomSource {
    rng: StdRng,
}

impl StdRandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derive a seed from any hashable config summary, per §9's "default seed
    /// derived from config hash".
    pub fn seed_from_hashable<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

impl RandomSource for StdRandomSource {
    fn uniform_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// A fixed-sequence source for tests: returns gaps/choices from a predetermined
/// list, cycling the last value once exhausted.
pub struct FixedRandomSource {
    gaps: Vec<f64>,
    gap_idx: usize,
    choices: Vec<usize>,
    choice_idx: usize,
}

impl FixedRandomSource {
    pub fn new(gaps: Vec<f64>, choices: Vec<usize>) -> Self {
        Self {
            gaps,
            gap_idx: 0,
            choices,
            choice_idx: 0,
        }
    }
}

impl RandomSource for FixedRandomSource {
    fn uniform_range(&mut self, min: f64, max: f64) -> f64 {
        if self.gaps.is_empty() {
            return min;
        }
        let v = self.gaps[self.gap_idx.min(self.gaps.len() - 1)];
        self.gap_idx += 1;
        v.clamp(min, max.max(min))
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if self.choices.is_empty() {
            return 0;
        }
        let v = self.choices[self.choice_idx.min(self.choices.len() - 1)];
        self.choice_idx += 1;
        v % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = StdRandomSource::from_seed(42);
        let mut b = StdRandomSource::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.uniform_range(0.0, 24.0), b.uniform_range(0.0, 24.0));
        }
    }

    #[test]
    fn fixed_source_cycles_last_value() {
        let mut src = FixedRandomSource::new(vec![5.0, 10.0], vec![2]);
        assert_eq!(src.uniform_range(0.0, 24.0), 5.0);
        assert_eq!(src.uniform_range(0.0, 24.0), 10.0);
        assert_eq!(src.uniform_range(0.0, 24.0), 10.0);
    }

    #[test]
    fn seed_from_hashable_is_deterministic() {
        let a = StdRandomSource::seed_from_hashable(&"config-summary");
        let b = StdRandomSource::seed_from_hashable(&"config-summary");
        assert_eq!(a, b);
    }
}
