//! Sensitivity of a seed set for homologous regions.
//!
//! - **Oracle** (`oracle`): exact hit probability of a seed set
//! - **Memory guard** (`memory`): confirmation before large computations
//!
//! `SensitivityEvaluator` ties both together for the optimizer and turns
//! every failure into a `SensitivityOutcome` instead of an error.

mod memory;
mod oracle;

use std::sync::Arc;

pub use memory::{
    InteractiveMemoryGuard, LOW_MEMORY_RATIO, MAX_ATTEMPTS, MemoryGuard, NoGuard,
    free_memory_ratio,
};
pub use oracle::{HitAutomatonOracle, MAX_SEED_LENGTH, OracleError, SensitivityOracle};

use crate::schema::{OptimizerConfig, PatternSet};

/// Result of one sensitivity evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensitivityOutcome {
    Computed(f64),
    /// The oracle ran out of its state budget.
    OutOfMemory,
    /// A pattern is longer than `MAX_SEED_LENGTH`.
    PatternTooLong,
    /// The memory guard refused to proceed.
    Declined,
    /// The oracle rejected its input.
    Failed,
}

impl SensitivityOutcome {
    /// The computed value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Computed(sensitivity) => Some(sensitivity),
            _ => None,
        }
    }
}

/// Adapter between the optimizer and a `SensitivityOracle`.
///
/// The memory guard is consulted at most once per evaluator: a positive
/// answer covers every later evaluation.
#[derive(Debug, Clone)]
pub struct SensitivityEvaluator {
    oracle: Arc<dyn SensitivityOracle>,
    guard: Arc<dyn MemoryGuard>,
    approved: Option<bool>,
}

impl SensitivityEvaluator {
    pub fn new(oracle: Arc<dyn SensitivityOracle>, guard: Arc<dyn MemoryGuard>) -> Self {
        Self {
            oracle,
            guard,
            approved: None,
        }
    }

    /// Shipped oracle with the configured state budget and no memory guard.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            Arc::new(HitAutomatonOracle::new(config.oracle_state_budget)),
            Arc::new(NoGuard),
        )
    }

    /// Replace the memory guard, keeping the oracle.
    pub fn with_guard(mut self, guard: Arc<dyn MemoryGuard>) -> Self {
        self.guard = guard;
        self.approved = None;
        self
    }

    /// Sensitivity of `set` for a region of `region_length` positions.
    ///
    /// With `force` set the memory guard is skipped.
    pub fn evaluate(
        &mut self,
        set: &PatternSet,
        region_length: usize,
        match_probability: f64,
        force: bool,
    ) -> SensitivityOutcome {
        if set.max_length() > MAX_SEED_LENGTH {
            return SensitivityOutcome::PatternTooLong;
        }

        if !force && !self.approve() {
            return SensitivityOutcome::Declined;
        }

        let seeds: Vec<String> = set.iter().map(ToString::to_string).collect();
        match self
            .oracle
            .sensitivity(&seeds, region_length, match_probability)
        {
            Ok(sensitivity) => SensitivityOutcome::Computed(sensitivity),
            Err(OracleError::OutOfMemory { budget }) => {
                log::debug!("Sensitivity oracle exceeded {} states", budget);
                SensitivityOutcome::OutOfMemory
            }
            Err(OracleError::SeedTooLong { .. }) => SensitivityOutcome::PatternTooLong,
            Err(err @ OracleError::InvalidSeed(_)) => {
                log::error!("{}", err);
                SensitivityOutcome::Failed
            }
        }
    }

    fn approve(&mut self) -> bool {
        *self
            .approved
            .get_or_insert_with(|| self.guard.safe_to_proceed())
    }
}
