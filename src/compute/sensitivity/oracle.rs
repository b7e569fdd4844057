//! Exact hit probability of a seed set on a random homologous region.
//!
//! The region is modelled as `H` independent positions, each a match with
//! probability `P`. A seed hits if, at some offset, every one of its match
//! positions falls on a match. The oracle runs a forward recurrence over the
//! set of *live placements*: occurrences of a seed that started somewhere
//! in the region and have not yet read a mismatch at a match position.
//! Regions that already produced a hit are absorbed and dropped, so the
//! mass left after `H` steps is the probability of no hit.

use std::collections::HashMap;

/// Longest seed the oracle accepts. Live placements of one seed are packed
/// into a single `u64`.
pub const MAX_SEED_LENGTH: usize = 63;

/// Errors from a sensitivity computation.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Sensitivity state space exceeded {budget} states")]
    OutOfMemory { budget: usize },
    #[error("Seed length {length} exceeds the supported maximum of {MAX_SEED_LENGTH}")]
    SeedTooLong { length: usize },
    #[error("Invalid seed '{0}': expected a non-empty string of '0' and '1'")]
    InvalidSeed(String),
}

/// Computes the probability that at least one seed hits a region.
pub trait SensitivityOracle: std::fmt::Debug + Send + Sync {
    /// Sensitivity of `seeds` (strings of `'1'` and `'0'`) for a region of
    /// `region_length` positions with per-position match probability
    /// `match_probability`.
    fn sensitivity(
        &self,
        seeds: &[String],
        region_length: usize,
        match_probability: f64,
    ) -> Result<f64, OracleError>;
}

/// One seed in bitmask form.
#[derive(Debug, Clone, Copy)]
struct SeedMask {
    len: usize,
    /// Bit `i` set if slot `i` is a don't-care position.
    dont_care: u64,
    /// Bits for placements that have read `1..len` slots.
    live: u64,
}

impl SeedMask {
    fn parse(seed: &str) -> Result<Self, OracleError> {
        let len = seed.len();
        if len == 0 {
            return Err(OracleError::InvalidSeed(seed.to_string()));
        }
        if len > MAX_SEED_LENGTH {
            return Err(OracleError::SeedTooLong { length: len });
        }

        let mut dont_care = 0u64;
        for (i, symbol) in seed.bytes().enumerate() {
            match symbol {
                b'1' => {}
                b'0' => dont_care |= 1 << i,
                _ => return Err(OracleError::InvalidSeed(seed.to_string())),
            }
        }

        Ok(Self {
            len,
            dont_care,
            live: (1u64 << (len - 1)) - 1,
        })
    }

    /// Advance the live placements of this seed by one region position.
    ///
    /// Bit `i` of `state` is a placement that has read `i + 1` slots. Returns
    /// the next state, or `None` if a placement completed (a hit).
    #[inline]
    fn step(&self, state: u64, start: bool, is_match: bool) -> Option<u64> {
        // Bit `j` of `reading`: a placement about to read slot `j`.
        let reading = (state << 1) | u64::from(start);
        let survivors = if is_match {
            reading
        } else {
            reading & self.dont_care
        };
        if (survivors >> (self.len - 1)) & 1 == 1 {
            None
        } else {
            Some(survivors & self.live)
        }
    }
}

/// Forward recurrence over live seed placements.
///
/// Memory grows with the number of distinct live-placement states, which
/// depends on the seed lengths and the region length. The oracle refuses
/// to hold more than `state_budget` states at once and reports
/// `OracleError::OutOfMemory` instead.
#[derive(Debug, Clone)]
pub struct HitAutomatonOracle {
    state_budget: usize,
}

impl HitAutomatonOracle {
    pub fn new(state_budget: usize) -> Self {
        Self { state_budget }
    }

    pub fn state_budget(&self) -> usize {
        self.state_budget
    }
}

impl SensitivityOracle for HitAutomatonOracle {
    fn sensitivity(
        &self,
        seeds: &[String],
        region_length: usize,
        match_probability: f64,
    ) -> Result<f64, OracleError> {
        let masks = seeds
            .iter()
            .map(|seed| SeedMask::parse(seed))
            .collect::<Result<Vec<_>, _>>()?;
        if masks.is_empty() {
            return Ok(0.0);
        }

        let mismatch_probability = 1.0 - match_probability;
        let mut states: HashMap<Vec<u64>, f64> = HashMap::new();
        states.insert(vec![0; masks.len()], 1.0);

        for position in 0..region_length {
            let mut next: HashMap<Vec<u64>, f64> = HashMap::with_capacity(states.len() * 2);

            for (state, mass) in &states {
                for (is_match, probability) in
                    [(true, match_probability), (false, mismatch_probability)]
                {
                    let advanced = masks
                        .iter()
                        .zip(state)
                        .map(|(mask, &bits)| {
                            // Placements that cannot finish inside the region never hit.
                            let start = position + mask.len <= region_length;
                            mask.step(bits, start, is_match)
                        })
                        .collect::<Option<Vec<u64>>>();

                    if let Some(advanced) = advanced {
                        *next.entry(advanced).or_insert(0.0) += mass * probability;
                    }
                }
            }

            if next.len() > self.state_budget {
                return Err(OracleError::OutOfMemory {
                    budget: self.state_budget,
                });
            }
            log::trace!("Sensitivity position {}: {} live states", position, next.len());
            states = next;
        }

        let miss: f64 = states.values().sum();
        Ok((1.0 - miss).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn oracle() -> HitAutomatonOracle {
        HitAutomatonOracle::new(1 << 16)
    }

    #[test]
    fn test_contiguous_seed_fills_region() {
        // Only one placement: all three positions must match.
        let p = 0.7;
        let sens = oracle().sensitivity(&seeds(&["111"]), 3, p).unwrap();
        assert!((sens - p * p * p).abs() < 1e-12);
    }

    #[test]
    fn test_two_placements_hand_computed() {
        // "11" in a region of 3: P(hit) = 1/4 + 1/4 - 1/8.
        let sens = oracle().sensitivity(&seeds(&["11"]), 3, 0.5).unwrap();
        assert!((sens - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_dont_care_positions_are_free() {
        // "101" in a region of 3 only needs the outer positions.
        let p = 0.6;
        let sens = oracle().sensitivity(&seeds(&["101"]), 3, p).unwrap();
        assert!((sens - p * p).abs() < 1e-12);
    }

    #[test]
    fn test_seed_longer_than_region_never_hits() {
        let sens = oracle().sensitivity(&seeds(&["1111"]), 3, 0.9).unwrap();
        assert_eq!(sens, 0.0);
    }

    #[test]
    fn test_more_seeds_never_lower_sensitivity() {
        let single = oracle()
            .sensitivity(&seeds(&["1101"]), 16, 0.75)
            .unwrap();
        let pair = oracle()
            .sensitivity(&seeds(&["1101", "1011"]), 16, 0.75)
            .unwrap();
        assert!(pair >= single);
        assert!(pair <= 1.0);
    }

    #[test]
    fn test_state_budget_reports_out_of_memory() {
        let tiny = HitAutomatonOracle::new(2);
        let result = tiny.sensitivity(&seeds(&["1000000001", "1000000011"]), 32, 0.75);
        assert!(matches!(
            result,
            Err(OracleError::OutOfMemory { budget: 2 })
        ));
    }

    #[test]
    fn test_rejects_bad_seeds() {
        assert!(matches!(
            oracle().sensitivity(&seeds(&["1x1"]), 8, 0.5),
            Err(OracleError::InvalidSeed(_))
        ));
        let long = "1".repeat(MAX_SEED_LENGTH + 1);
        assert!(matches!(
            oracle().sensitivity(&[long], 80, 0.5),
            Err(OracleError::SeedTooLong { length: 64 })
        ));
    }
}
