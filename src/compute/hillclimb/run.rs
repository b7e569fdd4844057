//! Configuration-driven entry point used by the binary.

use serde::Serialize;

use crate::compute::generator::SeedRng;
use crate::compute::sensitivity::SensitivityEvaluator;
use crate::schema::{OptimizerConfig, PatternSet};

use super::OptimizerError;
use super::engine::SeedSetOptimizer;

/// Which search a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// `hill_climbing(limit)` on the initial set.
    HillClimb,
    /// `iterate_hill_climbing(limit, restarts)`.
    Restarts,
    /// `hill_climbing_sensitivity(limit, restarts, sensitivity_loops)`.
    Sensitivity,
}

impl SearchMode {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        if config.sensitivity {
            Self::Sensitivity
        } else if config.restarts <= 1 {
            Self::HillClimb
        } else {
            Self::Restarts
        }
    }
}

/// Build the initial set described by `config` and run the selected search.
///
/// Starts from `config.pattern_file` when given, from a random set
/// otherwise.
pub fn run_search(
    config: OptimizerConfig,
    evaluator: SensitivityEvaluator,
) -> Result<SeedSetOptimizer, OptimizerError> {
    let mode = SearchMode::from_config(&config);
    let rng = SeedRng::from_config(&config);

    let mut optimizer = match config.pattern_file.clone() {
        Some(path) => {
            let set = PatternSet::from_file(&path)?;
            log::info!("Loaded {} patterns from {}", set.len(), path.display());
            SeedSetOptimizer::from_pattern_set_with(config, set, rng, evaluator)?
        }
        None => SeedSetOptimizer::random_with(config, rng, evaluator)?,
    };

    log::info!("Initial set ({:?}):\n{}", mode, optimizer.summary());

    let limit = optimizer.config().limit;
    let restarts = optimizer.config().restarts;
    let loops = optimizer.config().sensitivity_loops;

    let improved = match mode {
        SearchMode::HillClimb => optimizer.hill_climbing(limit),
        SearchMode::Restarts => optimizer.iterate_hill_climbing(limit, restarts),
        SearchMode::Sensitivity => optimizer.hill_climbing_sensitivity(limit, restarts, loops),
    };

    let stats = optimizer.stats();
    log::info!(
        "Search finished ({}): {} trials, {} accepted, {} restarts",
        if improved { "improved" } else { "no improvement" },
        stats.trials,
        stats.accepted,
        stats.restarts
    );
    Ok(optimizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_config() -> OptimizerConfig {
        let mut config = OptimizerConfig::with_shape(4, 4, 3, 5);
        config.random_seed = Some(77);
        config.limit = 50;
        config.restarts = 3;
        config.sensitivity_loops = 2;
        config.region_length = 16;
        config
    }

    #[test]
    fn test_mode_selection() {
        let mut config = small_config();
        assert_eq!(SearchMode::from_config(&config), SearchMode::Restarts);
        config.restarts = 1;
        assert_eq!(SearchMode::from_config(&config), SearchMode::HillClimb);
        config.restarts = 0;
        assert_eq!(SearchMode::from_config(&config), SearchMode::HillClimb);
        config.sensitivity = true;
        assert_eq!(SearchMode::from_config(&config), SearchMode::Sensitivity);
    }

    #[test]
    fn test_run_each_mode() {
        let mut config = small_config();
        let opt = run_search(config.clone(), SensitivityEvaluator::from_config(&config)).unwrap();
        assert_eq!(opt.stats().restarts, 3);
        assert_eq!(opt.len(), 4);

        config.restarts = 1;
        let opt = run_search(config.clone(), SensitivityEvaluator::from_config(&config)).unwrap();
        assert_eq!(opt.stats().trials, 50);
        assert_eq!(opt.stats().restarts, 0);

        config.sensitivity = true;
        let opt = run_search(config.clone(), SensitivityEvaluator::from_config(&config)).unwrap();
        assert!((0.0..=1.0).contains(&opt.sensitivity()));
        assert!(opt.stats().sensitivity_evaluations > 0);
    }

    #[test]
    fn test_run_from_pattern_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("start.pat");
        std::fs::write(&path, "1100101\n1011001\n").unwrap();

        let mut config = small_config();
        config.pattern_file = Some(path);
        config.restarts = 1;
        let opt = run_search(config.clone(), SensitivityEvaluator::from_config(&config)).unwrap();

        assert_eq!(opt.len(), 2);
        assert_eq!(opt.config().dont_care.map(|r| (r.min, r.max)), Some((3, 3)));
    }
}
