//! Evolutionary Trainer
//!
//! This crate provides the orchestration layer of the trainer:
//! - Running each candidate up a difficulty-ranked ladder of opponent
//!   engines and scoring the runs
//! - Evaluating a whole generation concurrently on a bounded worker pool
//! - Building the next generation via survival, mutation and breeding
//! - Tracking skill-level progression and stagnation to decide when
//!   training stops
//!
//! # Usage
//!
//! ```bash
//! # Train with the default config file (training.toml)
//! cargo run -p trainer -- train
//!
//! # Normalize an engine catalog file (sort ascending by rating)
//! cargo run -p trainer -- catalog engines/catalog.json
//! ```

mod catalog;
mod config;
mod ladder;
mod population;
mod progression;
mod run;
mod scheduler;
mod selector;
mod store;
mod transcript;

pub use catalog::*;
pub use config::*;
pub use ladder::*;
pub use population::*;
pub use progression::*;
pub use run::*;
pub use scheduler::*;
pub use selector::*;
pub use store::*;
pub use transcript::*;

use thiserror::Error;

use evo_core::{EngineProcessError, IncompatibleModels, PersistenceError, SelectionError};

/// Top-level error for a training run.
///
/// Per-candidate engine failures never surface here; the scheduler isolates
/// them. Anything that does reach this type aborts the run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Engine(#[from] EngineProcessError),
    #[error(transparent)]
    Breed(#[from] IncompatibleModels),
}
