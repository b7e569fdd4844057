//! Optimizer state: the seed set, its coefficient matrix and the score.

use std::ops::Index;
use std::path::Path;

use serde::Serialize;

use crate::compute::capacity::clamp_config;
use crate::compute::generator::SeedRng;
use crate::compute::matrix::CoefficientMatrix;
use crate::compute::objective::Objective;
use crate::compute::sensitivity::{SensitivityEvaluator, SensitivityOutcome};
use crate::schema::{DontCareRange, OptimizerConfig, Pattern, PatternSet};

use super::OptimizerError;

/// Sentinel for a score or sensitivity that has not been computed.
pub const NOT_COMPUTED: f64 = -1.0;

/// Counters accumulated over the lifetime of an optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Mutation trials run by `hill_climbing`.
    pub trials: u64,
    /// Trials that lowered the score.
    pub accepted: u64,
    /// Fresh random sets generated by the restart searches.
    pub restarts: u64,
    /// Calls into the sensitivity evaluator.
    pub sensitivity_evaluations: u64,
}

/// Hill-climbing optimizer for a set of spaced seeds.
///
/// The public `PatternSet` is kept sorted by per-pattern score, so the
/// patterns contributing most to the set score are mutated first. A second,
/// index-aligned list mirrors it for the matrix bookkeeping; `Pattern::idx`
/// maps a public position to its matrix row.
#[derive(Debug, Clone)]
pub struct SeedSetOptimizer {
    pub(super) config: OptimizerConfig,
    pub(super) objective: Objective,
    pub(super) rng: SeedRng,
    pub(super) evaluator: SensitivityEvaluator,
    pub(super) set: PatternSet,
    pub(super) patterns: Vec<Pattern>,
    pub(super) matrix: CoefficientMatrix,
    pub(super) score: f64,
    pub(super) sensitivity: f64,
    pub(super) mutation_pointer: usize,
    pub(super) stats: SearchStats,
}

/// The part of the optimizer state that the restart searches keep a best
/// copy of.
#[derive(Debug, Clone)]
pub(super) struct Snapshot {
    set: PatternSet,
    patterns: Vec<Pattern>,
    matrix: CoefficientMatrix,
    pub(super) score: f64,
}

impl SeedSetOptimizer {
    /// Optimizer without patterns. Its set accepts patterns of
    /// `config.weight`.
    pub fn empty(config: OptimizerConfig) -> Self {
        let rng = SeedRng::from_config(&config);
        let evaluator = SensitivityEvaluator::from_config(&config);
        let set = PatternSet::new(config.weight);
        Self::assemble(config, rng, evaluator, set)
    }

    /// Optimizer over a random set of the configured shape.
    pub fn random(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        let rng = SeedRng::from_config(&config);
        let evaluator = SensitivityEvaluator::from_config(&config);
        Self::random_with(config, rng, evaluator)
    }

    /// Optimizer over a random set, with explicit collaborators.
    ///
    /// The requested size is clamped to the number of distinct patterns of
    /// the configured shape before generation.
    pub fn random_with(
        mut config: OptimizerConfig,
        mut rng: SeedRng,
        evaluator: SensitivityEvaluator,
    ) -> Result<Self, OptimizerError> {
        config.validate()?;
        clamp_config(&mut config);

        let range = config.resolved_dont_care();
        config.dont_care = Some(range);
        let set = rng.random_set(config.size, config.weight, range);
        config.size = set.len();

        let mut optimizer = Self::assemble(config, rng, evaluator, set);
        optimizer.populate();
        Ok(optimizer)
    }

    /// Optimizer starting from `set`.
    ///
    /// The configuration adopts the shape of the set: its size, weight and
    /// don't-care bounds drive every later restart.
    pub fn from_pattern_set(
        config: OptimizerConfig,
        set: PatternSet,
    ) -> Result<Self, OptimizerError> {
        let rng = SeedRng::from_config(&config);
        let evaluator = SensitivityEvaluator::from_config(&config);
        Self::from_pattern_set_with(config, set, rng, evaluator)
    }

    /// Optimizer starting from `set`, with explicit collaborators.
    pub fn from_pattern_set_with(
        mut config: OptimizerConfig,
        set: PatternSet,
        rng: SeedRng,
        evaluator: SensitivityEvaluator,
    ) -> Result<Self, OptimizerError> {
        config.size = set.len();
        if !set.is_empty() {
            config.weight = set.weight();
            config.dont_care = Some(DontCareRange::new(
                set.min_dont_care(),
                set.max_dont_care(),
            ));
        }
        config.validate()?;

        let mut optimizer = Self::assemble(config, rng, evaluator, set);
        optimizer.populate();
        Ok(optimizer)
    }

    /// Optimizer starting from the patterns in a pattern file.
    pub fn from_file<P: AsRef<Path>>(
        config: OptimizerConfig,
        path: P,
    ) -> Result<Self, OptimizerError> {
        let set = PatternSet::from_file(path)?;
        Self::from_pattern_set(config, set)
    }

    fn assemble(
        config: OptimizerConfig,
        rng: SeedRng,
        evaluator: SensitivityEvaluator,
        set: PatternSet,
    ) -> Self {
        let objective = Objective::from_config(&config);
        let mut optimizer = Self {
            config,
            objective,
            rng,
            evaluator,
            set,
            patterns: Vec::new(),
            matrix: CoefficientMatrix::default(),
            score: 0.0,
            sensitivity: NOT_COMPUTED,
            mutation_pointer: 0,
            stats: SearchStats::default(),
        };
        optimizer.rebuild_working_list();
        optimizer
    }

    fn populate(&mut self) {
        self.calculate();
        self.calculate_sensitivity();
        log::debug!(
            "Initial set of {} patterns, score {}",
            self.len(),
            self.score
        );
    }

    /// Re-index the public set, mirror it into the working list and reset
    /// the matrix to zeros of the new size.
    pub(super) fn rebuild_working_list(&mut self) {
        for (i, pattern) in self.set.iter_mut().enumerate() {
            pattern.set_idx(i);
        }
        self.patterns = self.set.iter().cloned().collect();
        self.matrix = CoefficientMatrix::new(self.patterns.len());
    }

    /// Replace the set with a fresh random one of the configured shape and
    /// score it.
    pub(super) fn regenerate(&mut self) {
        clamp_config(&mut self.config);
        let range = self.config.resolved_dont_care();
        self.set = self
            .rng
            .random_set(self.config.size, self.config.weight, range);
        self.rebuild_working_list();
        self.calculate();
    }

    /// Matrix entry for rows `i` and `j`, always evaluated with the lower
    /// index first so that full and incremental updates agree bit for bit.
    #[inline]
    fn entry(&self, i: usize, j: usize) -> f64 {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        self.objective.pair(a, b, &self.patterns[a], &self.patterns[b])
    }

    /// Rebuild the whole coefficient matrix, the per-pattern scores and the
    /// set score.
    pub fn calculate(&mut self) {
        let n = self.patterns.len();
        if self.matrix.dim() != n {
            self.matrix = CoefficientMatrix::new(n);
        }

        for i in 0..n {
            for j in i..n {
                let value = self.entry(i, j);
                self.matrix.set_symmetric(i, j, value);
            }
        }
        for i in 0..n {
            let row_sum: f64 = self.matrix.row(i).iter().sum();
            self.patterns[i].set_score(row_sum);
        }

        self.score = self.matrix.upper_triangle_sum();
        self.sync_set_scores();
    }

    /// Recompute row and column `idx` after the working pattern at `idx`
    /// changed, adjusting the per-pattern scores and the set score by the
    /// difference. Every other entry is left untouched.
    pub fn update(&mut self, idx: usize) {
        let mut own = 0.0;
        for i in 0..self.patterns.len() {
            let old = self.matrix.get(i, idx);
            let new = self.entry(i, idx);

            self.score -= old;
            let partial = self.patterns[i].score() - old;
            self.matrix.set_symmetric(i, idx, new);
            self.patterns[i].set_score(partial + new);
            self.score += new;
            own += new;
        }
        self.patterns[idx].set_score(own);
        self.sync_set_scores();
    }

    /// Copy the per-pattern scores from the working list to the public set.
    pub(super) fn sync_set_scores(&mut self) {
        for pattern in self.set.iter_mut() {
            pattern.set_score(self.patterns[pattern.idx()].score());
        }
    }

    /// Append `pattern` if its weight matches the set.
    ///
    /// The matrix grows and is zero-filled but not recomputed; score and
    /// sensitivity go back to `NOT_COMPUTED` until `calculate` runs. The
    /// configured size and don't-care bounds widen to include the pattern.
    pub fn push_back(&mut self, mut pattern: Pattern) {
        if pattern.weight() != self.set.weight() {
            return;
        }

        let dont_care = pattern.dont_care();
        let idx = self.patterns.len();
        pattern.set_idx(idx);
        self.patterns.push(pattern.clone());
        self.set.push(pattern);
        self.matrix = CoefficientMatrix::new(self.patterns.len());

        self.score = NOT_COMPUTED;
        self.sensitivity = NOT_COMPUTED;

        let range = self.config.resolved_dont_care();
        self.config.size = self.set.len();
        self.config.dont_care = Some(DontCareRange::new(
            range.min.min(dont_care),
            range.max.max(dont_care),
        ));
    }

    /// Evaluate the sensitivity of the public set, if enabled.
    ///
    /// Any failure turns sensitivity off for the rest of the run.
    pub fn calculate_sensitivity(&mut self) {
        if !self.config.sensitivity {
            return;
        }

        self.stats.sensitivity_evaluations += 1;
        let outcome = self.evaluator.evaluate(
            &self.set,
            self.config.region_length,
            self.config.match_probability,
            self.config.force_sensitivity,
        );

        match outcome {
            SensitivityOutcome::Computed(sensitivity) => self.sensitivity = sensitivity,
            SensitivityOutcome::OutOfMemory => {
                self.disable_sensitivity("the sensitivity oracle ran out of memory")
            }
            SensitivityOutcome::PatternTooLong => {
                self.disable_sensitivity("a pattern is longer than 63 positions")
            }
            SensitivityOutcome::Declined => {
                self.disable_sensitivity("the memory check declined to proceed")
            }
            SensitivityOutcome::Failed => {
                self.disable_sensitivity("the sensitivity oracle failed")
            }
        }
    }

    fn disable_sensitivity(&mut self, reason: &str) {
        log::warn!("Deactivating sensitivity calculation: {}", reason);
        self.config.sensitivity = false;
        self.sensitivity = NOT_COMPUTED;
    }

    /// Swap the set, working list, matrix and score with `snapshot`.
    pub(super) fn swap_state(&mut self, snapshot: &mut Snapshot) {
        std::mem::swap(&mut self.set, &mut snapshot.set);
        std::mem::swap(&mut self.patterns, &mut snapshot.patterns);
        std::mem::swap(&mut self.matrix, &mut snapshot.matrix);
        std::mem::swap(&mut self.score, &mut snapshot.score);
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            set: self.set.clone(),
            patterns: self.patterns.clone(),
            matrix: self.matrix.clone(),
            score: self.score,
        }
    }

    /// Set score: `Σ_{i <= j} M[i][j]`. Lower is better.
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Set score divided by the number of upper-triangular entries.
    pub fn normalized_score(&self) -> f64 {
        let n = self.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        self.score / (n * (n + 1.0) / 2.0)
    }

    /// Sensitivity of the current set, or `NOT_COMPUTED`.
    #[inline]
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The public set, sorted by descending per-pattern score after every
    /// accepted mutation.
    pub fn pattern_set(&self) -> &PatternSet {
        &self.set
    }

    /// Working list, in matrix order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Configuration as adjusted by the optimizer.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn matrix(&self) -> &CoefficientMatrix {
        &self.matrix
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Position in the public set targeted by the next `climb_hill`.
    pub fn mutation_pointer(&self) -> usize {
        self.mutation_pointer
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Replace the pattern generator.
    ///
    /// A clone carries an exact copy of the generator state and repeats the
    /// original's searches; give each copy of a parallel run its own stream.
    pub fn with_rng(mut self, rng: SeedRng) -> Self {
        self.rng = rng;
        self
    }

    /// Restart the pattern generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SeedRng::new(seed);
    }
}

impl Index<usize> for SeedSetOptimizer {
    type Output = Pattern;

    fn index(&self, idx: usize) -> &Pattern {
        &self.patterns[idx]
    }
}

impl<'a> IntoIterator for &'a SeedSetOptimizer {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}
