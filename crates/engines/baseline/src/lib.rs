//! Baseline Collaborators
//!
//! Simple reference implementations of the trainer's capability traits:
//! - A deterministic two-player subtraction game standing in for chess rules
//! - An engine whose play strength scales with its catalog rating
//! - A linear table model with mutation, breeding and serialization
//!
//! Useful for:
//! - Testing the training infrastructure before wiring real chess rules,
//!   UCI engine processes and neural network models
//! - Baseline comparisons and demo runs of the full training loop

mod engine;
mod game;
mod model;

pub use engine::{BaselineEngine, BaselineProvider};
pub use game::{NimBoard, NimRules, START_TOKENS};
pub use model::{TableCodec, TableModel, TableModelFactory, DEFAULT_WEIGHTS};
