//! Concurrent evaluation of a whole generation.

use log::{info, warn};
use rayon::prelude::*;

use evo_core::{Generation, Termination};

use crate::config::ConfigError;
use crate::ladder::TournamentLadder;

/// Runs every candidate of a generation up the ladder on a bounded worker
/// pool.
///
/// Each worker owns exactly one ladder run to completion; runs are
/// internally sequential and block on their engine exchanges. Results are
/// written through the candidate itself, so completion order never matters.
/// Returning from [`TournamentScheduler::run_generation`] is the generation
/// barrier: no caller advances the population while any run is in flight.
pub struct TournamentScheduler {
    pool: rayon::ThreadPool,
}

impl TournamentScheduler {
    /// Build a scheduler with `workers` threads, capping in-flight engine
    /// processes to that number.
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ladder-{}", i))
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "workers",
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    /// Score every candidate in place. Per-candidate failures are isolated:
    /// an aborted run keeps its partial score and the rest of the
    /// generation proceeds.
    pub fn run_generation(&self, generation: &mut Generation, ladder: &TournamentLadder<'_>) {
        let index = generation.index;
        info!(
            "generation {}: scoring {} candidates",
            index,
            generation.len()
        );

        self.pool.install(|| {
            generation.candidates.par_iter_mut().for_each(|candidate| {
                let run = ladder.run(candidate, index, 0);
                if run.termination == Termination::Aborted {
                    warn!(
                        "{}: ladder run aborted at rung {} with partial score {:.1}",
                        candidate.name, run.reached_rung, run.score
                    );
                }
                candidate.record_run(&run);
            });
        });
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
