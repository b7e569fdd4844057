//! Compute module - Scoring, generation and search for spaced-seed sets.

mod capacity;
mod generator;
mod matrix;
mod objective;

pub mod hillclimb;
pub mod sensitivity;

pub use capacity::*;
pub use generator::*;
pub use matrix::*;
pub use objective::*;

pub use hillclimb::{OptimizerError, SearchReport, SearchStats, SeedSetOptimizer};
