//! Configuration types for seed set optimisation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_size() -> usize {
    10
}
fn default_weight() -> usize {
    8
}
fn default_sequence_length() -> usize {
    10_000
}
fn default_match_probability() -> f64 {
    0.75
}
fn default_background_probability() -> f64 {
    0.25
}
fn default_region_length() -> usize {
    64
}
fn default_limit() -> usize {
    25_000
}
fn default_restarts() -> usize {
    100
}
fn default_sensitivity_loops() -> usize {
    5_000
}
fn default_oracle_state_budget() -> usize {
    1 << 21
}

/// Pairwise objective minimised by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Overlap complexity (Ilie & Ilie).
    #[default]
    OverlapComplexity,
    /// Variance of the number of spaced-word matches.
    Variance,
}

/// Inclusive range of don't-care positions per pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DontCareRange {
    pub min: usize,
    pub max: usize,
}

impl DontCareRange {
    /// Range with a single don't-care count.
    pub fn fixed(dont_care: usize) -> Self {
        Self {
            min: dont_care,
            max: dont_care,
        }
    }

    /// Range from two bounds in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

/// How much progress output a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Warnings only.
    Silent,
    /// Search milestones and final sets.
    #[default]
    Quiet,
    /// Every improved set along the way.
    Verbose,
}

/// Top-level optimisation configuration.
///
/// The optimizer takes its own copy; adjustments it makes (capacity
/// clamping, sensitivity deactivation, bounds widened by `push_back`) are
/// visible through `SeedSetOptimizer::config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Number of patterns in the set.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Match positions per pattern.
    #[serde(default = "default_weight")]
    pub weight: usize,
    /// Don't-care positions per pattern. `None` picks a default from the
    /// objective (see `resolved_dont_care`).
    #[serde(default)]
    pub dont_care: Option<DontCareRange>,
    /// Sequence length S used by the variance objective.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    /// Match probability P of homologous positions.
    #[serde(default = "default_match_probability")]
    pub match_probability: f64,
    /// Background match probability Q.
    #[serde(default = "default_background_probability")]
    pub background_probability: f64,
    /// Homologous region length H for sensitivity.
    #[serde(default = "default_region_length")]
    pub region_length: usize,
    /// Objective to minimise.
    #[serde(default)]
    pub objective: ObjectiveKind,
    /// Compute and optimise sensitivity.
    #[serde(default)]
    pub sensitivity: bool,
    /// Skip the low-memory confirmation before computing sensitivity.
    #[serde(default)]
    pub force_sensitivity: bool,
    /// Mutation trials per hill climb.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Random restarts per restart search.
    #[serde(default = "default_restarts")]
    pub restarts: usize,
    /// Candidate sets ranked by sensitivity.
    #[serde(default = "default_sensitivity_loops")]
    pub sensitivity_loops: usize,
    /// Maximum number of live DP states the sensitivity oracle may hold.
    #[serde(default = "default_oracle_state_budget")]
    pub oracle_state_budget: usize,
    /// Start from the patterns in this file instead of a random set.
    #[serde(default)]
    pub pattern_file: Option<PathBuf>,
    /// Write the best set here.
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub verbosity: Verbosity,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            weight: default_weight(),
            dont_care: None,
            sequence_length: default_sequence_length(),
            match_probability: default_match_probability(),
            background_probability: default_background_probability(),
            region_length: default_region_length(),
            objective: ObjectiveKind::default(),
            sensitivity: false,
            force_sensitivity: false,
            limit: default_limit(),
            restarts: default_restarts(),
            sensitivity_loops: default_sensitivity_loops(),
            oracle_state_budget: default_oracle_state_budget(),
            pattern_file: None,
            output: None,
            verbosity: Verbosity::default(),
            random_seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Configuration for `size` patterns of `weight` with don't-care counts
    /// in `min..=max`, everything else at defaults.
    pub fn with_shape(
        size: usize,
        weight: usize,
        min_dont_care: usize,
        max_dont_care: usize,
    ) -> Self {
        Self {
            size,
            weight,
            dont_care: Some(DontCareRange::new(min_dont_care, max_dont_care)),
            ..Default::default()
        }
    }

    /// Don't-care range actually used for generation.
    ///
    /// Without an explicit range, overlap complexity uses
    /// `[W + 3, 2 (W + 3)]` and variance uses `floor(W / P)`.
    pub fn resolved_dont_care(&self) -> DontCareRange {
        match self.dont_care {
            Some(range) => DontCareRange::new(range.min, range.max),
            None => match self.objective {
                ObjectiveKind::OverlapComplexity => {
                    DontCareRange::new(self.weight + 3, 2 * (self.weight + 3))
                }
                ObjectiveKind::Variance => {
                    DontCareRange::fixed((self.weight as f64 / self.match_probability) as usize)
                }
            },
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::EmptySet);
        }
        if self.weight < 2 {
            return Err(ConfigError::WeightTooSmall(self.weight));
        }
        for (name, value) in [
            ("match", self.match_probability),
            ("background", self.background_probability),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.sequence_length == 0 {
            return Err(ConfigError::InvalidSequenceLength);
        }
        if self.sensitivity && self.region_length == 0 {
            return Err(ConfigError::InvalidRegionLength);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Pattern set size must be non-zero")]
    EmptySet,
    #[error("Pattern weight must be at least 2, got {0}")]
    WeightTooSmall(usize),
    #[error("{name} probability must lie in (0, 1), got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Sequence length must be non-zero")]
    InvalidSequenceLength,
    #[error("Homologous region length must be non-zero when sensitivity is enabled")]
    InvalidRegionLength,
}
