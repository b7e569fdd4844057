//! Hill-climbing optimisation of spaced-seed sets.
//!
//! # Overview
//!
//! - **Engine** (`engine`): seed set, coefficient matrix and incremental
//!   score bookkeeping
//! - **Search** (`search`): single mutations, restarts and the
//!   sensitivity-guided outer loop
//! - **Report** (`report`): summaries and result files
//! - **Run** (`run`): configuration-driven entry point
//!
//! # Example
//!
//! ```rust,no_run
//! use spaced_seeds::compute::hillclimb::SeedSetOptimizer;
//! use spaced_seeds::schema::OptimizerConfig;
//!
//! let config = OptimizerConfig::with_shape(10, 8, 11, 22);
//! let mut optimizer = SeedSetOptimizer::random(config).unwrap();
//! optimizer.hill_climbing(25_000);
//! println!("{}", optimizer.summary());
//! ```

mod engine;
mod report;
mod run;
mod search;

pub use engine::{NOT_COMPUTED, SearchStats, SeedSetOptimizer};
pub use report::{ReportedPattern, SearchReport};
pub use run::{SearchMode, run_search};

use crate::schema::{ConfigError, PatternError};

/// Errors from building an optimizer.
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}
