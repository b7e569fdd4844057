//! Spaced Seeds - Optimisation of spaced-seed pattern sets.
//!
//! This crate searches for sets of spaced seeds (fixed-weight match /
//! don't-care templates) that minimise a pairwise interaction score,
//! either the overlap complexity or the variance of the number of
//! spaced-word matches, and optionally maximise the set's sensitivity for
//! homologous regions.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, pattern and pattern set types
//! - `compute`: Scoring, capacity bounds, generation, sensitivity and search
//!
//! # Example
//!
//! ```rust,no_run
//! use spaced_seeds::{
//!     compute::SeedSetOptimizer,
//!     schema::OptimizerConfig,
//! };
//!
//! // 10 patterns of weight 8 with 11 to 22 don't-care positions
//! let mut config = OptimizerConfig::with_shape(10, 8, 11, 22);
//! config.random_seed = Some(42);
//!
//! let mut optimizer = SeedSetOptimizer::random(config).unwrap();
//! optimizer.iterate_hill_climbing(25_000, 10);
//!
//! println!("Best set:\n{}", optimizer.summary());
//! ```

pub mod compute;
pub mod logging;
pub mod schema;

// Re-export commonly used types
pub use compute::{SearchReport, SeedSetOptimizer};
pub use schema::{OptimizerConfig, Pattern, PatternSet};
