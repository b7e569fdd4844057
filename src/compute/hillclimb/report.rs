//! Summaries of an optimizer run for printing and persistence.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::schema::{ObjectiveKind, PatternError};

use super::engine::{SearchStats, SeedSetOptimizer};

/// One pattern of a reported set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedPattern {
    /// Row of the pattern in the coefficient matrix.
    pub index: usize,
    pub pattern: String,
    /// Per-pattern contribution (full matrix row).
    pub score: f64,
}

/// Snapshot of an optimizer's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub objective: ObjectiveKind,
    pub weight: usize,
    /// Patterns in public set order.
    pub patterns: Vec<ReportedPattern>,
    pub score: f64,
    pub normalized_score: f64,
    /// Present only when sensitivity was computed.
    pub sensitivity: Option<f64>,
    pub stats: SearchStats,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pattern in &self.patterns {
            writeln!(f, "{} {}", pattern.index, pattern.pattern)?;
        }
        writeln!(f, "score             : {}", self.score)?;
        write!(f, "score (normalized): {}", self.normalized_score)?;
        if let Some(sensitivity) = self.sensitivity {
            write!(f, "\nsensitivity       : {}", sensitivity)?;
        }
        Ok(())
    }
}

impl SeedSetOptimizer {
    /// Summary of the current state.
    pub fn summary(&self) -> SearchReport {
        SearchReport {
            objective: self.config.objective,
            weight: self.set.weight(),
            patterns: self
                .set
                .iter()
                .map(|p| ReportedPattern {
                    index: p.idx(),
                    pattern: p.to_string(),
                    score: p.score(),
                })
                .collect(),
            score: self.score,
            normalized_score: self.normalized_score(),
            sensitivity: (self.sensitivity >= 0.0).then_some(self.sensitivity),
            stats: self.stats,
        }
    }

    /// Write the set to `path` in pattern file format, followed by comment
    /// lines with the scores and, if computed, the sensitivity.
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<(), PatternError> {
        let path = path.as_ref();
        self.set.to_file(path)?;

        let io_err = |source: io::Error| PatternError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# score              : {}", self.score).map_err(io_err)?;
        writeln!(writer, "# score (normalized) : {}", self.normalized_score()).map_err(io_err)?;
        if self.sensitivity >= 0.0 {
            writeln!(writer, "# sensitivity        : {}", self.sensitivity).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        log::info!("Pattern set written to {}", path.display());
        Ok(())
    }
}
