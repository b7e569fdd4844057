//! Schema module - Configuration and pattern types for seed set optimisation.

mod config;
mod pattern;
mod pattern_set;

pub use config::*;
pub use pattern::*;
pub use pattern_set::*;
