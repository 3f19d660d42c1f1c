//! Capability traits implemented by external collaborators.
//!
//! The orchestration layer drives scoring models, opponent engines and game
//! state exclusively through these traits. This allows swapping between
//! different model architectures, engine backends and rule sets without
//! touching the trainer.

use std::any::Any;
use std::path::Path;
use std::time::Duration;

use rand::RngCore;

use crate::errors::{
    EngineProcessError, IllegalMove, IncompatibleModels, PersistenceError,
};
use crate::types::{Color, EngineRung, GameStatus};

/// Game state as seen by the trainer.
///
/// Moves are exchanged in text notation (SAN/UCI for chess). The trainer
/// never interprets move text; it only feeds it back into the board or an
/// engine and records it in transcripts.
pub trait Board: Send {
    /// All legal moves in a stable order. The greedy move picker breaks
    /// evaluation ties in favor of the first-encountered move, so the order
    /// must not change between calls on the same position.
    fn legal_moves(&self) -> Vec<String>;

    /// Apply a move in place.
    fn apply(&mut self, mv: &str) -> Result<(), IllegalMove>;

    fn status(&self) -> GameStatus;

    fn side_to_move(&self) -> Color;

    /// Numeric feature encoding of the position, consumed by models.
    fn features(&self) -> Vec<f64>;

    fn clone_box(&self) -> Box<dyn Board>;
}

/// Rule set: produces fresh games.
pub trait Rules: Send + Sync {
    fn new_game(&self) -> Box<dyn Board>;
}

/// A chess-position scoring model with the evolutionary operations the
/// trainer needs. Implementations are immutable: mutation and breeding
/// return new models.
pub trait Model: Send + Sync {
    /// Score a position from the perspective of the side that made the
    /// last move. Higher is better for that side.
    fn evaluate(&self, board: &dyn Board) -> f64;

    /// A perturbed copy. `temperature` scales both how many parameters are
    /// touched and how far they move.
    fn mutate(&self, temperature: f64, rng: &mut dyn RngCore) -> Box<dyn Model>;

    /// Combine with another model of the same architecture.
    fn breed(&self, other: &dyn Model) -> Result<Box<dyn Model>, IncompatibleModels>;

    /// Opaque binary encoding, readable back through a [`ModelCodec`].
    fn serialize(&self) -> Vec<u8>;

    /// Downcast support so concrete implementations can inspect breeding
    /// partners.
    fn as_any(&self) -> &dyn Any;
}

/// Builds fresh models for population bootstrap.
pub trait ModelFactory: Send + Sync {
    /// Fresh model with the default architecture.
    fn fresh(&self, rng: &mut dyn RngCore) -> Box<dyn Model>;

    /// Fresh model with custom hidden layer sizes.
    fn with_architecture(&self, hidden: &[usize], rng: &mut dyn RngCore) -> Box<dyn Model>;

    /// Jittered copy of a serialized base model.
    fn from_base(&self, path: &Path, rng: &mut dyn RngCore)
        -> Result<Box<dyn Model>, PersistenceError>;
}

/// Reconstructs models from their stored encoding. Paired with
/// [`Model::serialize`] by the model store.
pub trait ModelCodec: Send + Sync {
    /// File extension for stored models (without the dot).
    fn extension(&self) -> &str;

    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Model>, PersistenceError>;
}

/// A running opponent engine.
///
/// One instance plays one rung attempt and is then released with
/// [`Engine::quit`]; instances are never shared between candidates.
pub trait Engine: Send {
    /// Best move for the side to move, within `time_limit`. Overrunning the
    /// limit or any communication failure is reported as an error, which the
    /// ladder surfaces as an aborted run.
    fn best_move(
        &mut self,
        board: &dyn Board,
        time_limit: Duration,
    ) -> Result<String, EngineProcessError>;

    fn name(&self) -> &str;

    /// Shut the engine down. Must be called on every exit path of a rung
    /// attempt so engine processes never leak.
    fn quit(&mut self) -> Result<(), EngineProcessError>;
}

/// Launches engine instances for ladder rungs. Implementations own process
/// spawning; the trainer only sees the handle.
pub trait EngineProvider: Send + Sync {
    fn launch(&self, rung: &EngineRung) -> Result<Box<dyn Engine>, EngineProcessError>;
}
