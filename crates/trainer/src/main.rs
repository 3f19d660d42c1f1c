//! Trainer CLI
//!
//! Evolve chess models by running them up a ladder of reference engines.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;

use baseline_engine::{BaselineProvider, NimRules, TableCodec, TableModelFactory};
use trainer::{
    bootstrap_population, sort_and_rewrite, EngineCatalog, FsModelStore, TrainError, Trainer,
    TrainingConfig, TrainingReport,
};

fn print_usage() {
    println!("Evolutionary Trainer");
    println!();
    println!("Usage:");
    println!("  trainer train [--config PATH] [--seed N]");
    println!("  trainer catalog <PATH>");
    println!();
    println!("Commands:");
    println!("  train     - Run the training loop (config defaults to training.toml)");
    println!("  catalog   - Sort an engine catalog file by rating and show it");
    println!();
    println!("Examples:");
    println!("  trainer train --config training.toml");
    println!("  trainer catalog engines/catalog.json");
}

fn run_train(args: &[String]) -> Result<(), TrainError> {
    let mut config_path = PathBuf::from("training.toml");
    let mut seed: Option<u64> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            other => {
                eprintln!("Warning: ignoring unknown argument {}", other);
            }
        }
        i += 1;
    }

    let config = TrainingConfig::load(&config_path)?;
    let catalog = EngineCatalog::load(&config.catalog_path)?;
    let provider = BaselineProvider;
    let rules = NimRules;
    let store = FsModelStore::new(&config.models_dir, Box::new(TableCodec));
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("=== Training ===");
    println!(
        "Population: {}, catalog: {} engines, workers: {}",
        config.population_size,
        catalog.len(),
        config.workers
    );
    println!();

    let initial = bootstrap_population(&config, &store, &TableModelFactory::default(), &mut rng)?;
    let trainer = Trainer {
        config: &config,
        catalog: &catalog,
        provider: &provider,
        rules: &rules,
        store: &store,
        verbose: true,
    };
    let report = trainer.run(initial, &mut rng)?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!();
    println!("=== Final Result ===");
    println!("Generations: {}", report.generations);
    println!("Level reached: {}", report.final_level);
    println!("Stopped: {}", report.stop);
    println!();
    println!("{:<4} {:<24} {:>8}", "#", "Model", "Score");
    for (rank, (name, score)) in report.ranking.iter().enumerate() {
        println!("{:<4} {:<24} {:>8.1}", rank + 1, name, score);
    }
}

fn show_catalog(path: &Path) -> Result<(), TrainError> {
    let catalog = sort_and_rewrite(path)?;
    println!("{:<6} {:<24} {:>8}  {}", "Rung", "Engine", "Rating", "Path");
    for rung in catalog.rungs() {
        println!(
            "{:<6} {:<24} {:>8}  {}",
            rung.index, rung.name, rung.rating, rung.path
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let result = match args[1].as_str() {
        "train" => run_train(&args[2..]),
        "catalog" => match args.get(2) {
            Some(path) => show_catalog(Path::new(path)),
            None => {
                eprintln!("Error: catalog requires a file path");
                print_usage();
                return ExitCode::FAILURE;
            }
        },
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
