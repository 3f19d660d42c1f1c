//! The outer training loop: score a generation, fold it into the
//! progression state, advance the population, repeat until a stop
//! condition fires.

use std::sync::Arc;

use log::info;
use rand::Rng;

use evo_core::{Candidate, EngineProvider, Generation, ModelFactory, Rules};

use crate::catalog::EngineCatalog;
use crate::config::TrainingConfig;
use crate::ladder::{LadderConfig, TournamentLadder};
use crate::population::PopulationManager;
use crate::progression::{ProgressionController, StopReason};
use crate::scheduler::TournamentScheduler;
use crate::store::ModelStore;
use crate::transcript::TranscriptWriter;
use crate::TrainError;

/// Final report of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Number of generations scored.
    pub generations: u64,
    pub final_level: usize,
    pub stop: StopReason,
    /// Final generation's candidates, best first.
    pub ranking: Vec<(String, f64)>,
}

/// Wires the orchestration components together for a full run.
pub struct Trainer<'a> {
    pub config: &'a TrainingConfig,
    pub catalog: &'a EngineCatalog,
    pub provider: &'a dyn EngineProvider,
    pub rules: &'a dyn Rules,
    pub store: &'a dyn ModelStore,
    /// Print per-generation summaries to stdout.
    pub verbose: bool,
}

impl Trainer<'_> {
    /// Run the training loop starting from `generation` until a stop
    /// condition fires. The final scored generation is archived before
    /// returning.
    pub fn run<R: Rng>(
        &self,
        mut generation: Generation,
        rng: &mut R,
    ) -> Result<TrainingReport, TrainError> {
        let scheduler = TournamentScheduler::new(self.config.workers)?;
        let transcripts = TranscriptWriter::new(self.config.results_dir.clone());
        let ladder_config = LadderConfig {
            move_time: self.config.move_time(),
            max_moves: self.config.max_moves,
        };
        let ladder = TournamentLadder::new(self.catalog, self.provider, self.rules, ladder_config)
            .with_transcripts(&transcripts);
        let manager = PopulationManager::new(self.store);
        let mut progression = ProgressionController::new(
            self.config.level_up_threshold,
            self.config.stagnation_limit,
            self.config.max_generations,
            self.catalog.len(),
        );

        loop {
            scheduler.run_generation(&mut generation, &ladder);
            progression.observe(&generation);

            if self.verbose {
                print_summary(&generation, &progression);
            }

            if let Some(stop) = progression.should_stop(&generation) {
                info!("stopping: {}", stop);
                // Archive the final scored generation; it would otherwise
                // be lost, since advance() is what persists.
                let mut last = generation;
                last.sort_by_score_desc();
                for candidate in &last.candidates {
                    self.store.put(last.index, candidate)?;
                }
                return Ok(TrainingReport {
                    generations: last.index + 1,
                    final_level: progression.level(),
                    stop,
                    ranking: last
                        .candidates
                        .iter()
                        .map(|c| (c.name.clone(), c.score))
                        .collect(),
                });
            }

            generation = manager.advance(
                generation,
                self.config.mutation_rate,
                self.config.decay_rate,
                self.config.population_size,
                rng,
            )?;
        }
    }
}

fn print_summary(generation: &Generation, progression: &ProgressionController) {
    let mean = if generation.is_empty() {
        0.0
    } else {
        generation.total_score() / generation.len() as f64
    };
    let best = generation
        .best()
        .map(|c| format!("{} ({:.1})", c.name, c.score))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Generation {:>4}: best {:<24} mean {:>6.1}  level {}  stagnation {}",
        generation.index,
        best,
        mean,
        progression.level(),
        progression.stagnation()
    );
}

/// Build the starting population: resume from the store's generation 0 if
/// present, otherwise seed fresh models.
///
/// Fresh models come from the configured base model when set, else from the
/// custom architecture when set, else from the factory default. Seeds are
/// named `model1..modelN`.
pub fn bootstrap_population<R: Rng>(
    config: &TrainingConfig,
    store: &dyn ModelStore,
    factory: &dyn ModelFactory,
    rng: &mut R,
) -> Result<Generation, TrainError> {
    let mut stored = store.list(0)?;
    // Re-archiving over an old run leaves one file per score for the same
    // name; keep the best-scoring copy so names stay unique.
    stored.sort_by(|a, b| {
        a.name.cmp(&b.name).then(
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    stored.dedup_by(|a, b| a.name == b.name);
    let candidates = if stored.is_empty() {
        info!(
            "no existing population found, seeding {} fresh models",
            config.population_size
        );
        let mut candidates = Vec::with_capacity(config.population_size);
        for i in 1..=config.population_size {
            let model = if let Some(base) = &config.base_model_path {
                factory.from_base(base, rng)?
            } else if let Some(layers) = &config.custom_architecture {
                factory.with_architecture(layers, rng)
            } else {
                factory.fresh(rng)
            };
            candidates.push(Candidate::new(format!("model{}", i), Arc::from(model)));
        }
        candidates
    } else {
        info!("resuming population of {} from generation 0", stored.len());
        stored
            .into_iter()
            .map(|mut c| {
                c.score = 0.0;
                c
            })
            .collect()
    };

    Ok(Generation {
        index: 0,
        candidates,
        survival_rate: config.survival_rate,
        temperature: config.temperature,
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod run_tests;
