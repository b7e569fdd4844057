//! Random pattern generation and mutation.
//!
//! All randomness used by the optimizer lives here, so a run is fully
//! determined by the seed given to `SeedRng`.

use std::collections::HashSet;

use rand::prelude::*;
use rand::seq::index;

use crate::schema::{DontCareRange, OptimizerConfig, Pattern, PatternSet};

/// Draws per requested pattern before `random_set` gives up on uniqueness.
const UNIQUE_DRAWS_PER_PATTERN: usize = 64;
/// Draws when looking for a distinct replacement for one pattern.
const VARIANT_ATTEMPTS: usize = 64;

/// Random number generator wrapper for pattern operations.
#[derive(Debug, Clone)]
pub struct SeedRng {
    rng: StdRng,
}

impl SeedRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded from `config.random_seed` when set, from entropy otherwise.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        match config.random_seed {
            Some(seed) => Self::new(seed),
            None => Self::random(),
        }
    }

    /// Random boundary-fixed pattern: first and last slots are matches, the
    /// don't-care count is uniform in `range`.
    pub fn random_pattern(&mut self, weight: usize, range: DontCareRange) -> Pattern {
        let dont_care = self.rng.gen_range(range.min..=range.max);
        let length = weight + dont_care;
        let mut slots = vec![false; length];

        match weight {
            0 => {}
            1 => slots[0] = true,
            _ => {
                slots[0] = true;
                slots[length - 1] = true;
                for i in index::sample(&mut self.rng, length - 2, weight - 2) {
                    slots[i + 1] = true;
                }
            }
        }

        Pattern::from_slots(slots)
    }

    /// Random set of up to `size` distinct patterns.
    ///
    /// Callers clamp `size` to the shape's capacity first; if uniqueness
    /// still cannot be reached within the draw budget the set comes back
    /// short and a warning is logged.
    pub fn random_set(&mut self, size: usize, weight: usize, range: DontCareRange) -> PatternSet {
        let mut seen = HashSet::with_capacity(size);
        let mut set = PatternSet::new(weight);
        let budget = size * UNIQUE_DRAWS_PER_PATTERN + 1024;

        for _ in 0..budget {
            if set.len() == size {
                break;
            }
            let pattern = self.random_pattern(weight, range);
            if seen.insert(pattern.clone()) {
                set.push(pattern);
            }
        }

        if set.len() < size {
            log::warn!(
                "Only {} of {} unique patterns could be drawn for weight {}",
                set.len(),
                size,
                weight
            );
        }
        set
    }

    /// A random variant of `pattern` that is not already in `set`.
    ///
    /// Tries swapping one interior match with one interior don't-care slot
    /// first, which keeps the length; falls back to a fresh random pattern
    /// from `range`. Returns `None` if no distinct variant was found.
    pub fn distinct_variant(
        &mut self,
        pattern: &Pattern,
        set: &PatternSet,
        range: DontCareRange,
    ) -> Option<Pattern> {
        let len = pattern.len();
        let interior = if len > 2 { 1..len - 1 } else { 0..0 };
        let matches: Vec<usize> = interior.clone().filter(|&i| pattern.is_match(i)).collect();
        let dont_cares: Vec<usize> = interior.filter(|&i| !pattern.is_match(i)).collect();

        if !matches.is_empty() && !dont_cares.is_empty() {
            for _ in 0..VARIANT_ATTEMPTS {
                let mut variant = pattern.clone();
                let a = matches[self.rng.gen_range(0..matches.len())];
                let b = dont_cares[self.rng.gen_range(0..dont_cares.len())];
                variant.swap_slots(a, b);
                if !set.contains(&variant) {
                    return Some(variant);
                }
            }
        }

        for _ in 0..VARIANT_ATTEMPTS {
            let mut variant = self.random_pattern(pattern.weight(), range);
            if variant != *pattern && !set.contains(&variant) {
                variant.set_idx(pattern.idx());
                variant.set_score(pattern.score());
                return Some(variant);
            }
        }

        None
    }

    /// Replace the pattern at `position` with a distinct random variant,
    /// keeping the set free of duplicates. The replacement keeps the matrix
    /// index of the old pattern. Returns `false` if the pattern was left
    /// unchanged.
    pub fn random_swap_uniq(
        &mut self,
        set: &mut PatternSet,
        position: usize,
        range: DontCareRange,
    ) -> bool {
        match self.distinct_variant(&set[position], set, range) {
            Some(variant) => {
                set[position] = variant;
                true
            }
            None => false,
        }
    }
}
