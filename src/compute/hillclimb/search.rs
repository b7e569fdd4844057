//! The three levels of the search: single mutations, restarts from random
//! sets and sensitivity-guided selection among restart winners.

use crate::schema::Pattern;

use super::engine::SeedSetOptimizer;

impl SeedSetOptimizer {
    /// One mutation trial.
    ///
    /// The pattern at the mutation pointer is replaced by a distinct random
    /// variant. If the set score strictly decreases the change is kept, the
    /// pointer returns to the front and the set is re-sorted. Otherwise every
    /// touched structure is restored exactly and the pointer advances.
    pub fn climb_hill(&mut self) -> bool {
        let n = self.set.len();
        if n == 0 {
            return false;
        }

        let position = self.mutation_pointer % n;
        let idx = self.set[position].idx();
        let range = self.config.resolved_dont_care();

        let last_score = self.score;
        let last_pattern = self.set[position].clone();
        let last_working = self.patterns[idx].clone();
        let last_column = self.matrix.column(idx);
        let last_scores: Vec<f64> = self.patterns.iter().map(Pattern::score).collect();

        if !self.rng.random_swap_uniq(&mut self.set, position, range) {
            log::trace!("No distinct variant for pattern {}", last_pattern);
            self.mutation_pointer += 1;
            return false;
        }

        self.patterns[idx] = self.set[position].clone();
        self.update(idx);

        if self.score < last_score {
            log::trace!(
                "Accepted {} -> {}: score {} -> {}",
                last_pattern,
                self.patterns[idx],
                last_score,
                self.score
            );
            self.mutation_pointer = 0;
            self.set.sort();
            return true;
        }

        self.set[position] = last_pattern;
        self.patterns[idx] = last_working;
        self.matrix.restore_column(idx, &last_column);
        for (pattern, score) in self.patterns.iter_mut().zip(last_scores) {
            pattern.set_score(score);
        }
        self.sync_set_scores();
        self.score = last_score;
        self.mutation_pointer += 1;
        false
    }

    /// Run exactly `limit` mutation trials.
    ///
    /// Returns `true` if the score ended lower than it started.
    pub fn hill_climbing(&mut self, limit: usize) -> bool {
        let initial = self.score;
        let mut improvements = 0usize;
        self.mutation_pointer = 0;

        for trial in 0..limit {
            self.stats.trials += 1;
            if self.climb_hill() {
                self.stats.accepted += 1;
                improvements += 1;
                log::debug!(
                    "Trial {}/{}: score {:.6} (normalized {:.6})",
                    trial + 1,
                    limit,
                    self.score,
                    self.normalized_score()
                );
            }
        }

        log::debug!(
            "Hill climbing: {} improvements in {} trials, score {} -> {}",
            improvements,
            limit,
            initial,
            self.score
        );
        self.score < initial
    }

    /// Hill-climb `iterations` fresh random sets and keep the one with the
    /// lowest score, including the current set.
    ///
    /// With sensitivity enabled at least one restart is always run.
    pub fn iterate_hill_climbing(&mut self, limit: usize, iterations: usize) -> bool {
        let iterations = if self.config.sensitivity {
            iterations.max(1)
        } else {
            iterations
        };

        let initial = self.score;
        let mut best = self.snapshot();
        let mut improvements = 0usize;

        for restart in 0..iterations {
            self.stats.restarts += 1;
            self.regenerate();
            self.hill_climbing(limit);

            if self.score < best.score {
                improvements += 1;
                log::info!(
                    "Restart {}/{}: new best score {:.6} (normalized {:.6})",
                    restart + 1,
                    iterations,
                    self.score,
                    self.normalized_score()
                );
                self.swap_state(&mut best);
            }
        }

        self.swap_state(&mut best);
        log::debug!(
            "Restart search: {} improvements in {} restarts",
            improvements,
            iterations
        );
        self.score < initial
    }

    /// Restart search bracketed by sensitivity evaluations.
    ///
    /// Returns `true` if the sensitivity after the search is higher than
    /// before it. With `init_sens` unset the current sensitivity value is
    /// taken as the starting point without recomputing it.
    pub fn climb_hill_sensitivity(
        &mut self,
        limit: usize,
        iterations: usize,
        init_sens: bool,
    ) -> bool {
        if init_sens {
            self.calculate_sensitivity();
        }
        let before = self.sensitivity;

        self.iterate_hill_climbing(limit, iterations);
        self.calculate_sensitivity();
        before < self.sensitivity
    }

    /// Run `loops` restart searches from fresh random sets and keep the
    /// winner with the highest sensitivity.
    ///
    /// The kept state always carries its own score; sensitivity failures
    /// turn sensitivity off but the loops still run to completion.
    pub fn hill_climbing_sensitivity(
        &mut self,
        limit: usize,
        iterations: usize,
        loops: usize,
    ) -> bool {
        let initial = self.sensitivity;
        let mut best_sensitivity = initial;
        let mut best = self.snapshot();
        let mut improvements = 0usize;

        for round in 0..loops {
            self.stats.restarts += 1;
            self.regenerate();
            self.climb_hill_sensitivity(limit, iterations, true);

            if best_sensitivity < self.sensitivity {
                improvements += 1;
                best_sensitivity = self.sensitivity;
                log::info!(
                    "Loop {}/{}: new best sensitivity {:.6} at score {:.6}",
                    round + 1,
                    loops,
                    self.sensitivity,
                    self.score
                );
                self.swap_state(&mut best);
            }
        }

        self.swap_state(&mut best);
        self.sensitivity = best_sensitivity;
        log::debug!(
            "Sensitivity search: {} improvements in {} loops",
            improvements,
            loops
        );
        initial < self.sensitivity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::compute::generator::SeedRng;
    use crate::compute::hillclimb::NOT_COMPUTED;
    use crate::compute::matrix::CoefficientMatrix;
    use crate::compute::sensitivity::{
        HitAutomatonOracle, NoGuard, OracleError, SensitivityEvaluator, SensitivityOracle,
    };
    use crate::schema::{OptimizerConfig, Pattern, PatternSet};

    use super::*;

    /// Everything `climb_hill` is allowed to touch, except the generator.
    #[derive(Debug, PartialEq)]
    struct State {
        set: Vec<(String, usize, u64)>,
        patterns: Vec<(String, usize, u64)>,
        matrix: CoefficientMatrix,
        score: u64,
    }

    fn describe(patterns: &[Pattern]) -> Vec<(String, usize, u64)> {
        patterns
            .iter()
            .map(|p| (p.to_string(), p.idx(), p.score().to_bits()))
            .collect()
    }

    fn state(opt: &SeedSetOptimizer) -> State {
        let set: Vec<Pattern> = opt.pattern_set().iter().cloned().collect();
        State {
            set: describe(&set),
            patterns: describe(opt.patterns()),
            matrix: opt.matrix().clone(),
            score: opt.score().to_bits(),
        }
    }

    fn config(size: usize, weight: usize, min_dc: usize, max_dc: usize) -> OptimizerConfig {
        let mut config = OptimizerConfig::with_shape(size, weight, min_dc, max_dc);
        config.random_seed = Some(2024);
        config
    }

    fn assert_consistent(opt: &SeedSetOptimizer) {
        assert!(opt.matrix().is_symmetric());
        let sum = opt.matrix().upper_triangle_sum();
        assert!((opt.score() - sum).abs() <= 1e-9 * sum.abs().max(1.0));
        for pattern in opt.pattern_set() {
            assert_eq!(pattern.score(), opt[pattern.idx()].score());
        }
    }

    #[derive(Debug, Default)]
    struct CountingOracle {
        calls: AtomicUsize,
    }

    impl SensitivityOracle for CountingOracle {
        fn sensitivity(
            &self,
            _seeds: &[String],
            _region_length: usize,
            _match_probability: f64,
        ) -> Result<f64, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.5)
        }
    }

    #[test]
    fn test_climb_hill_accepts_or_restores() {
        let mut opt = SeedSetOptimizer::random(config(6, 4, 3, 6)).unwrap();

        for _ in 0..300 {
            let before = state(&opt);
            let pointer = opt.mutation_pointer();
            if opt.climb_hill() {
                assert!(f64::from_bits(before.score) > opt.score());
                assert_eq!(opt.mutation_pointer(), 0);
            } else {
                assert_eq!(state(&opt), before);
                assert_eq!(opt.mutation_pointer(), pointer + 1);
            }
            assert_consistent(&opt);
        }
    }

    #[test]
    fn test_accepted_mutation_sorts_set() {
        let mut opt = SeedSetOptimizer::random(config(6, 4, 3, 6)).unwrap();
        opt.hill_climbing(500);

        let scores: Vec<f64> = opt.pattern_set().iter().map(Pattern::score).collect();
        if opt.stats().accepted > 0 {
            assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn test_hill_climbing_zero_is_noop() {
        let mut opt = SeedSetOptimizer::random(config(5, 4, 4, 4)).unwrap();
        let before = state(&opt);
        assert!(!opt.hill_climbing(0));
        assert_eq!(state(&opt), before);
        assert_eq!(opt.stats().trials, 0);
    }

    #[test]
    fn test_hill_climbing_never_worsens() {
        let mut opt = SeedSetOptimizer::random(config(5, 4, 4, 4)).unwrap();
        let initial = opt.score();
        let improved = opt.hill_climbing(1000);

        assert!(opt.score() <= initial);
        assert_eq!(improved, opt.score() < initial);
        assert_eq!(opt.stats().trials, 1000);
        assert_consistent(&opt);

        // Matrix still agrees with a full rebuild.
        let incremental = opt.score();
        opt.calculate();
        assert!((incremental - opt.score()).abs() <= 1e-9 * incremental.abs());
    }

    #[test]
    fn test_hill_climbing_resets_pointer() {
        let mut opt = SeedSetOptimizer::random(config(4, 4, 3, 3)).unwrap();
        opt.mutation_pointer = 17;
        opt.hill_climbing(1);
        assert!(opt.mutation_pointer() <= 1);
    }

    #[test]
    fn test_iterate_keeps_best() {
        let mut opt = SeedSetOptimizer::random(config(5, 4, 3, 6)).unwrap();
        let initial = opt.score();
        let improved = opt.iterate_hill_climbing(100, 5);

        assert!(opt.score() <= initial);
        assert_eq!(improved, opt.score() < initial);
        assert_eq!(opt.stats().restarts, 5);
        assert_eq!(opt.len(), 5);
        assert_consistent(&opt);
    }

    #[test]
    fn test_iterate_zero_iterations_keeps_state() {
        let mut opt = SeedSetOptimizer::random(config(5, 4, 3, 6)).unwrap();
        let before = state(&opt);
        assert!(!opt.iterate_hill_climbing(100, 0));
        assert_eq!(state(&opt), before);
    }

    #[test]
    fn test_iterate_with_sensitivity_runs_at_least_once() {
        let mut cfg = config(3, 3, 1, 3);
        cfg.sensitivity = true;
        cfg.region_length = 12;
        let mut opt = SeedSetOptimizer::random(cfg).unwrap();
        opt.iterate_hill_climbing(10, 0);
        assert_eq!(opt.stats().restarts, 1);
    }

    #[test]
    fn test_sensitivity_search() {
        let mut cfg = config(3, 3, 1, 3);
        cfg.sensitivity = true;
        cfg.region_length = 16;
        let mut opt = SeedSetOptimizer::random(cfg).unwrap();
        let initial = opt.sensitivity();
        assert!((0.0..=1.0).contains(&initial));

        let improved = opt.hill_climbing_sensitivity(50, 2, 4);
        let sensitivity = opt.sensitivity();
        assert!(sensitivity >= initial);
        assert_eq!(improved, sensitivity > initial);
        assert_consistent(&opt);

        // The kept sensitivity belongs to the kept set.
        let seeds: Vec<String> = opt.pattern_set().iter().map(ToString::to_string).collect();
        let recomputed = HitAutomatonOracle::new(opt.config().oracle_state_budget)
            .sensitivity(&seeds, 16, opt.config().match_probability)
            .unwrap();
        assert!((recomputed - sensitivity).abs() < 1e-12);
    }

    #[test]
    fn test_climb_hill_sensitivity_reports_change() {
        let mut cfg = config(3, 3, 1, 3);
        cfg.sensitivity = true;
        cfg.region_length = 16;
        let mut opt = SeedSetOptimizer::random(cfg).unwrap();

        opt.sensitivity = NOT_COMPUTED;
        assert!(opt.climb_hill_sensitivity(20, 1, false));
        assert!(opt.sensitivity() >= 0.0);
    }

    #[test]
    fn test_pattern_length_64_disables_sensitivity_before_oracle() {
        let mut cfg = config(3, 4, 60, 60);
        cfg.sensitivity = true;

        let oracle = Arc::new(CountingOracle::default());
        let evaluator = SensitivityEvaluator::new(oracle.clone(), Arc::new(NoGuard));
        let opt = SeedSetOptimizer::random_with(cfg.clone(), SeedRng::new(9), evaluator).unwrap();

        assert!(!opt.config().sensitivity);
        assert_eq!(opt.sensitivity(), NOT_COMPUTED);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);

        // Everything else matches a run that never asked for sensitivity.
        cfg.sensitivity = false;
        let plain = SeedSetOptimizer::random_with(
            cfg,
            SeedRng::new(9),
            SensitivityEvaluator::from_config(&OptimizerConfig::default()),
        )
        .unwrap();
        assert_eq!(state(&opt), state(&plain));
    }

    #[test]
    fn test_disabled_sensitivity_loops_still_complete() {
        let mut cfg = config(3, 4, 60, 60);
        cfg.sensitivity = true;
        let mut opt = SeedSetOptimizer::random(cfg).unwrap();

        assert!(!opt.hill_climbing_sensitivity(5, 1, 3));
        assert_eq!(opt.sensitivity(), NOT_COMPUTED);
        assert_eq!(opt.stats().restarts, 3 + 3);
        assert_consistent(&opt);
    }

    #[test]
    fn test_clone_is_independent() {
        let opt = SeedSetOptimizer::random(config(5, 4, 3, 6)).unwrap();
        let before = state(&opt);

        let mut copy = opt.clone();
        copy.hill_climbing(200);
        copy.push_back("1000000111".parse().unwrap());

        assert_eq!(state(&opt), before);
    }

    #[test]
    fn test_reseeded_clones_search_differently() {
        let mut cfg = config(6, 4, 3, 6);
        cfg.random_seed = None;
        let opt = SeedSetOptimizer::random(cfg).unwrap();

        let mut a = opt.clone().with_rng(SeedRng::new(1));
        let mut b = opt.clone();
        b.reseed(2);
        a.iterate_hill_climbing(200, 4);
        b.iterate_hill_climbing(200, 4);
        assert_ne!(state(&a), state(&b));

        // Same seed, same search.
        let mut c = opt.clone().with_rng(SeedRng::new(1));
        c.iterate_hill_climbing(200, 4);
        assert_eq!(state(&a), state(&c));
    }

    #[test]
    fn test_oracle_out_of_memory_disables_sensitivity_once() {
        let mut cfg = config(3, 3, 1, 3);
        cfg.sensitivity = true;
        cfg.region_length = 16;

        let evaluator =
            SensitivityEvaluator::new(Arc::new(HitAutomatonOracle::new(1)), Arc::new(NoGuard));
        let mut opt = SeedSetOptimizer::random_with(cfg, SeedRng::new(3), evaluator).unwrap();
        assert!(!opt.config().sensitivity);
        assert_eq!(opt.stats().sensitivity_evaluations, 1);

        assert!(!opt.hill_climbing_sensitivity(20, 1, 3));
        assert!(!opt.config().sensitivity);
        assert_eq!(opt.sensitivity(), NOT_COMPUTED);
        assert_eq!(opt.stats().sensitivity_evaluations, 1);
        assert_eq!(opt.stats().restarts, 3 + 3);
        assert_consistent(&opt);
    }

    #[test]
    fn test_sensitivity_loops_evaluate_fresh_sets_first() {
        let mut cfg = config(3, 3, 1, 3);
        cfg.sensitivity = true;

        let oracle = Arc::new(CountingOracle::default());
        let evaluator = SensitivityEvaluator::new(oracle.clone(), Arc::new(NoGuard));
        let mut opt = SeedSetOptimizer::random_with(cfg, SeedRng::new(4), evaluator).unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

        // Each loop evaluates before and after its restart search.
        opt.hill_climbing_sensitivity(5, 1, 3);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1 + 3 * 2);
    }

    #[test]
    fn test_loaded_set_restarts_with_its_shape() {
        let set = PatternSet::parse("110101 101011 1100011").unwrap();
        let mut cfg = OptimizerConfig::default();
        cfg.random_seed = Some(5);
        let mut opt = SeedSetOptimizer::from_pattern_set(cfg, set).unwrap();

        opt.iterate_hill_climbing(20, 3);
        assert_eq!(opt.len(), 3);
        for pattern in opt.pattern_set() {
            assert_eq!(pattern.weight(), 4);
            assert!((2..=3).contains(&pattern.dont_care()));
        }
    }
}
