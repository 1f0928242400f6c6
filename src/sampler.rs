//! # Episode Sampler Module
//!
//! Unbiased random selection of episodes.
//!
//! - `count < len`: Fisher-Yates over an index array, first `count` shuffled
//!   indices are taken in shuffle order
//! - `count >= len`: every candidate, fully shuffled
//!
//! Asking for "more than there is" therefore never returns the catalog order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Random selector seeded once per process.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Seeds from the current time in nanoseconds.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(nanos)
    }

    /// Deterministic sampler, mostly useful in tests and benchmarks.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Picks `min(count, candidates.len())` distinct candidates.
    ///
    /// `count` must be at least 1. An empty `candidates` yields an empty result.
    pub fn select<T: Clone>(&mut self, candidates: &[T], count: usize) -> Vec<T> {
        if count >= candidates.len() {
            let mut all = candidates.to_vec();
            self.shuffle(&mut all);
            return all;
        }

        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        self.shuffle(&mut indices);
        indices
            .into_iter()
            .take(count)
            .map(|index| candidates[index].clone())
            .collect()
    }

    /// In-place Fisher-Yates: walk from the last index down to 1, swapping
    /// each slot with a uniform pick from `[0, i]`.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            items.swap(i, j);
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_time()
    }
}
