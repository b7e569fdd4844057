//! Pairwise objective terms between two patterns.
//!
//! The set score is the upper-triangular sum of a symmetric matrix whose
//! entries are produced here. Both objectives are minimised.

use std::ops::RangeInclusive;

use crate::schema::{ObjectiveKind, OptimizerConfig, Pattern};

/// Scoring strategy for the coefficient matrix.
pub trait PairwiseObjective {
    /// Term for a pattern paired with itself (matrix diagonal).
    fn diagonal(&self, pattern: &Pattern) -> f64;

    /// Term for two distinct patterns.
    fn cross(&self, first: &Pattern, second: &Pattern) -> f64;
}

/// Every shift at which `second` still overlaps `first`.
#[inline]
pub fn cross_shifts(first: &Pattern, second: &Pattern) -> RangeInclusive<isize> {
    -(second.len() as isize - 1)..=first.len() as isize - 1
}

/// Contribution of a pattern pair to the variance of the number of
/// spaced-word matches between two sequences of length S.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceObjective {
    pub sequence_length: f64,
    pub weight: usize,
    pub match_probability: f64,
    pub background_probability: f64,
}

impl VarianceObjective {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            sequence_length: config.sequence_length as f64,
            weight: config.weight,
            match_probability: config.match_probability,
            background_probability: config.background_probability,
        }
    }

    fn accumulate(
        &self,
        first: &Pattern,
        second: &Pattern,
        shifts: RangeInclusive<isize>,
    ) -> f64 {
        // Integer mean of the two lengths, truncated before use.
        let length_mean = ((first.len() + 1 + second.len()) / 2) as f64;
        let s = self.sequence_length;
        let p = self.match_probability;
        let q = self.background_probability;
        let full = 2 * self.weight;
        let p_full = p.powf(full as f64);
        let q_full = q.powf(full as f64);

        let mut coef = 0.0;
        for shift in shifts {
            let exponent = full.saturating_sub(first.overlap(second, shift)) as f64;
            coef += (s - length_mean + 1.0) * (p.powf(exponent) - p_full)
                + (s - length_mean + 1.0) * (s - length_mean) * (q.powf(exponent) - q_full);
        }
        coef
    }
}

impl PairwiseObjective for VarianceObjective {
    fn diagonal(&self, pattern: &Pattern) -> f64 {
        self.accumulate(pattern, pattern, 0..=pattern.len() as isize - 1)
    }

    fn cross(&self, first: &Pattern, second: &Pattern) -> f64 {
        self.accumulate(first, second, cross_shifts(first, second))
    }
}

/// Overlap complexity: `Σ_s 2^O(s)` over all shifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapComplexityObjective;

impl OverlapComplexityObjective {
    /// Term for a single aligned-overlap count.
    #[inline]
    pub fn term(overlap: usize) -> f64 {
        2f64.powi(overlap as i32)
    }
}

impl PairwiseObjective for OverlapComplexityObjective {
    fn diagonal(&self, pattern: &Pattern) -> f64 {
        self.cross(pattern, pattern)
    }

    fn cross(&self, first: &Pattern, second: &Pattern) -> f64 {
        cross_shifts(first, second)
            .map(|shift| Self::term(first.overlap(second, shift)))
            .sum()
    }
}

/// The objective selected for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    Variance(VarianceObjective),
    OverlapComplexity(OverlapComplexityObjective),
}

impl Objective {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        match config.objective {
            ObjectiveKind::Variance => Self::Variance(VarianceObjective::from_config(config)),
            ObjectiveKind::OverlapComplexity => {
                Self::OverlapComplexity(OverlapComplexityObjective)
            }
        }
    }

    /// Matrix entry for patterns at matrix positions `i` and `j`.
    #[inline]
    pub fn pair(&self, i: usize, j: usize, first: &Pattern, second: &Pattern) -> f64 {
        if i == j {
            self.diagonal(first)
        } else {
            self.cross(first, second)
        }
    }
}

impl PairwiseObjective for Objective {
    fn diagonal(&self, pattern: &Pattern) -> f64 {
        match self {
            Self::Variance(v) => v.diagonal(pattern),
            Self::OverlapComplexity(oc) => oc.diagonal(pattern),
        }
    }

    fn cross(&self, first: &Pattern, second: &Pattern) -> f64 {
        match self {
            Self::Variance(v) => v.cross(first, second),
            Self::OverlapComplexity(oc) => oc.cross(first, second),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pat(s: &str) -> Pattern {
        s.parse().unwrap()
    }

    #[test]
    fn test_oc_single_match_seed() {
        // "1" against itself: one shift, one aligned match.
        let p = pat("1");
        assert_eq!(OverlapComplexityObjective.diagonal(&p), 2.0);
    }

    #[test]
    fn test_oc_hand_computed() {
        // Overlaps of "11" vs "101" over shifts -2..=1 are 1, 1, 1, 1.
        let a = pat("11");
        let b = pat("101");
        assert_eq!(OverlapComplexityObjective.cross(&a, &b), 8.0);
        assert_eq!(OverlapComplexityObjective.cross(&b, &a), 8.0);
    }

    #[test]
    fn test_oc_term_strictly_increasing() {
        for overlap in 0..62 {
            assert!(
                OverlapComplexityObjective::term(overlap)
                    < OverlapComplexityObjective::term(overlap + 1)
            );
        }
    }

    #[test]
    fn test_variance_cross_is_symmetric() {
        let config = OptimizerConfig {
            weight: 4,
            ..Default::default()
        };
        let objective = VarianceObjective::from_config(&config);
        let a = pat("1100101");
        let b = pat("1010011");
        assert_eq!(objective.cross(&a, &b), objective.cross(&b, &a));
    }

    #[test]
    fn test_variance_diagonal_uses_non_negative_shifts() {
        // For "11" the diagonal sums shifts 0 and 1 only.
        let config = OptimizerConfig {
            weight: 2,
            sequence_length: 100,
            ..Default::default()
        };
        let objective = VarianceObjective::from_config(&config);
        let p = pat("11");

        let (s, l) = (100.0f64, 2.0f64);
        let term = |o: i32| {
            (s - l + 1.0) * (0.75f64.powi(4 - o) - 0.75f64.powi(4))
                + (s - l + 1.0) * (s - l) * (0.25f64.powi(4 - o) - 0.25f64.powi(4))
        };
        let expected = term(2) + term(1);
        let got = objective.diagonal(&p);
        assert!((got - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn test_variance_length_mean_truncates() {
        // Lengths 3 and 4 give (3 + 1 + 4) / 2 = 4; lengths 3 and 3 give 3.
        let config = OptimizerConfig {
            weight: 2,
            sequence_length: 50,
            ..Default::default()
        };
        let objective = VarianceObjective::from_config(&config);
        let a = pat("101");
        let b = pat("1001");

        let (s, l) = (50.0f64, 4.0f64);
        let term = |o: i32| {
            (s - l + 1.0) * (0.75f64.powi(4 - o) - 0.75f64.powi(4))
                + (s - l + 1.0) * (s - l) * (0.25f64.powi(4 - o) - 0.25f64.powi(4))
        };
        let expected: f64 = cross_shifts(&a, &b)
            .map(|shift| term(a.overlap(&b, shift) as i32))
            .sum();
        let got = objective.cross(&a, &b);
        assert!((got - expected).abs() < 1e-9 * expected.abs().max(1.0));
    }

    proptest! {
        #[test]
        fn prop_oc_cross_is_symmetric(
            a in proptest::collection::vec(any::<bool>(), 0..12),
            b in proptest::collection::vec(any::<bool>(), 0..12),
        ) {
            let wrap = |mut slots: Vec<bool>| {
                slots.insert(0, true);
                slots.push(true);
                Pattern::from_slots(slots)
            };
            let (a, b) = (wrap(a), wrap(b));
            prop_assert_eq!(
                OverlapComplexityObjective.cross(&a, &b),
                OverlapComplexityObjective.cross(&b, &a)
            );
        }
    }

    #[test]
    fn test_objective_dispatch() {
        let mut config = OptimizerConfig::default();
        assert!(matches!(
            Objective::from_config(&config),
            Objective::OverlapComplexity(_)
        ));
        config.objective = ObjectiveKind::Variance;
        assert!(matches!(
            Objective::from_config(&config),
            Objective::Variance(_)
        ));
    }
}
