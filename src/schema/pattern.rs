//! Spaced-seed pattern type.
//!
//! A pattern is a fixed-length template of match (`1`) and don't-care (`0`)
//! slots. Besides its shape it carries the bookkeeping the optimizer needs:
//! the position of the pattern in the coefficient matrix and its running
//! contribution to the set score.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

/// A single spaced seed.
///
/// Equality, hashing and ordering only look at the slot layout, so two
/// patterns with the same shape compare equal regardless of their matrix
/// index or score.
#[derive(Debug, Clone)]
pub struct Pattern {
    slots: Vec<bool>,
    weight: usize,
    idx: usize,
    score: f64,
}

impl Pattern {
    /// Create a pattern from its match/don't-care slots.
    pub fn from_slots(slots: Vec<bool>) -> Self {
        let weight = slots.iter().filter(|&&slot| slot).count();
        Self {
            slots,
            weight,
            idx: 0,
            score: 0.0,
        }
    }

    /// Total length (weight + don't-care positions).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of match positions.
    #[inline]
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Number of don't-care positions.
    #[inline]
    pub fn dont_care(&self) -> usize {
        self.slots.len() - self.weight
    }

    /// Whether slot `position` is a match position.
    #[inline]
    pub fn is_match(&self, position: usize) -> bool {
        self.slots[position]
    }

    pub fn slots(&self) -> &[bool] {
        &self.slots
    }

    /// Number of aligned match positions when `other` is placed `shift`
    /// slots to the right of `self` (negative shifts move it left).
    ///
    /// Meaningful shifts range over `-(other.len() - 1)..=self.len() - 1`;
    /// anything outside that window has no aligned slots and yields 0.
    pub fn overlap(&self, other: &Pattern, shift: isize) -> usize {
        let start = shift.max(0);
        let end = (other.len() as isize + shift).min(self.len() as isize);
        if end <= start {
            return 0;
        }

        (start..end)
            .filter(|&i| self.slots[i as usize] && other.slots[(i - shift) as usize])
            .count()
    }

    /// Index of this pattern in the coefficient matrix.
    #[inline]
    pub fn idx(&self) -> usize {
        self.idx
    }

    #[inline]
    pub fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    /// Running contribution of this pattern to the set score.
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Swap the contents of two slots.
    pub(crate) fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.hash(state);
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slots
            .len()
            .cmp(&other.slots.len())
            .then_with(|| self.slots.cmp(&other.slots))
    }
}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &slot in &self.slots {
            f.write_str(if slot { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PatternError::Empty);
        }

        let slots = s
            .chars()
            .enumerate()
            .map(|(position, symbol)| match symbol {
                '1' => Ok(true),
                '0' => Ok(false),
                _ => Err(PatternError::InvalidSymbol { symbol, position }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_slots(slots))
    }
}

/// Errors from parsing patterns and reading or writing pattern files.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Invalid pattern symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("Pattern file {} contains no patterns", path.display())]
    NoPatterns { path: PathBuf },
    #[error("Patterns must share one weight: expected {expected}, found {found}")]
    MixedWeights { expected: usize, found: usize },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
