//! Spaced Seeds CLI - Optimise seed sets from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use spaced_seeds::{
    compute::{
        hillclimb::{SearchMode, run_search},
        sensitivity::{InteractiveMemoryGuard, SensitivityEvaluator},
    },
    logging,
    schema::{ObjectiveKind, OptimizerConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Optimise a spaced-seed set from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to optimizer configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: OptimizerConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    logging::init_logger(config.verbosity);

    let range = config.resolved_dont_care();
    println!("Spaced Seed Optimisation");
    println!("========================");
    println!("S (sequence length): {}", config.sequence_length);
    println!("p: {}", config.match_probability);
    println!("q: {}", config.background_probability);
    println!("H (region length): {}", config.region_length);
    println!("Don't care: {} - {}", range.min, range.max);
    println!("Weight: {}", config.weight);
    println!("Patterns: {}", config.size);
    println!(
        "Objective: {}",
        match config.objective {
            ObjectiveKind::OverlapComplexity => "overlap complexity",
            ObjectiveKind::Variance => "variance",
        }
    );
    println!("Search: {:?}", SearchMode::from_config(&config));
    println!(
        "Trials: {}, restarts: {}, sensitivity loops: {}",
        config.limit, config.restarts, config.sensitivity_loops
    );
    println!();

    let mut evaluator = SensitivityEvaluator::from_config(&config);
    if config.sensitivity && !config.force_sensitivity {
        evaluator = evaluator.with_guard(Arc::new(InteractiveMemoryGuard::stdin()));
    }
    let output = config.output.clone();

    // Run search
    let start = Instant::now();
    let optimizer = run_search(config, evaluator).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    println!("Optimised set:");
    println!("{}", optimizer.summary());
    println!();
    println!("Time: {:.2}s", elapsed.as_secs_f32());

    if let Some(path) = output {
        if let Err(e) = optimizer.write_report(&path) {
            eprintln!("Error writing output: {}", e);
            std::process::exit(1);
        }
        println!("Set written to {}", path.display());
    }
}

fn print_example_config() {
    let mut config = OptimizerConfig::with_shape(10, 8, 11, 22);
    config.random_seed = Some(42);
    config.output = Some(PathBuf::from("best.pat"));

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example config: {}", e),
    }
}
