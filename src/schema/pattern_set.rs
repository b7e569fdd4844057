//! Ordered collections of same-weight patterns and the pattern file format.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;

use super::{Pattern, PatternError};

/// Characters that separate patterns in a pattern file.
const SEPARATORS: [char; 6] = [',', ' ', '.', ';', '\n', '\t'];

/// Public, ordered view of a seed set.
///
/// This is the view used for generation, sorting and persistence. The
/// optimizer keeps a separate index-aligned list for its matrix bookkeeping;
/// `Pattern::idx` links the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    weight: usize,
    min_dont_care: usize,
    max_dont_care: usize,
}

impl PatternSet {
    /// Create an empty set accepting patterns of `weight`.
    pub fn new(weight: usize) -> Self {
        Self {
            patterns: Vec::new(),
            weight,
            min_dont_care: 0,
            max_dont_care: 0,
        }
    }

    /// Build a set from patterns sharing one weight.
    pub fn from_patterns(patterns: Vec<Pattern>) -> Result<Self, PatternError> {
        let weight = patterns.first().map(Pattern::weight).unwrap_or(0);
        let mut set = Self::new(weight);
        for pattern in patterns {
            if pattern.weight() != weight {
                return Err(PatternError::MixedWeights {
                    expected: weight,
                    found: pattern.weight(),
                });
            }
            set.push(pattern);
        }
        Ok(set)
    }

    /// Parse the textual pattern format.
    ///
    /// Lines starting with `#` are comments; patterns are separated by any
    /// of `,` ` ` `.` `;` or whitespace.
    pub fn parse(content: &str) -> Result<Self, PatternError> {
        let patterns = content
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(|line| line.split(SEPARATORS))
            .filter(|token| !token.trim().is_empty())
            .map(str::parse::<Pattern>)
            .collect::<Result<Vec<Pattern>, _>>()?;
        Self::from_patterns(patterns)
    }

    /// Load a set from a pattern file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::parse(&content)?;
        if set.is_empty() {
            return Err(PatternError::NoPatterns {
                path: path.to_path_buf(),
            });
        }
        Ok(set)
    }

    /// Write one pattern per line.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for pattern in &self.patterns {
            writeln!(writer, "{}", pattern)?;
        }
        Ok(())
    }

    /// Write the set to `path`, replacing any existing file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PatternError> {
        let path = path.as_ref();
        let io_err = |source: io::Error| PatternError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = fs::File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)
    }

    /// Append a pattern and widen the don't-care bounds to include it.
    ///
    /// The caller is responsible for matching the set weight.
    pub fn push(&mut self, pattern: Pattern) {
        let dont_care = pattern.dont_care();
        if self.patterns.is_empty() {
            self.min_dont_care = dont_care;
            self.max_dont_care = dont_care;
        } else {
            self.min_dont_care = self.min_dont_care.min(dont_care);
            self.max_dont_care = self.max_dont_care.max(dont_care);
        }
        self.patterns.push(pattern);
    }

    /// Sort by descending pattern score; ties fall back to pattern layout.
    pub fn sort(&mut self) {
        self.patterns.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then_with(|| a.cmp(b))
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[inline]
    pub fn weight(&self) -> usize {
        self.weight
    }

    #[inline]
    pub fn min_dont_care(&self) -> usize {
        self.min_dont_care
    }

    #[inline]
    pub fn max_dont_care(&self) -> usize {
        self.max_dont_care
    }

    /// Length of the longest pattern.
    pub fn max_length(&self) -> usize {
        self.patterns.iter().map(Pattern::len).max().unwrap_or(0)
    }

    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.patterns.contains(pattern)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Pattern> {
        self.patterns.iter_mut()
    }
}

impl Index<usize> for PatternSet {
    type Output = Pattern;

    fn index(&self, idx: usize) -> &Pattern {
        &self.patterns[idx]
    }
}

impl IndexMut<usize> for PatternSet {
    fn index_mut(&mut self, idx: usize) -> &mut Pattern {
        &mut self.patterns[idx]
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
