//! Shared error types.
//!
//! Config and catalog errors live next to their loaders in the trainer
//! crate; the types here are the ones the capability traits themselves
//! need to speak.

use std::time::Duration;

use thiserror::Error;

/// Engine process failures: spawn or communication problems.
///
/// These degrade a ladder run to an `Aborted` termination and are isolated
/// to the one candidate whose run hit them.
#[derive(Debug, Error)]
pub enum EngineProcessError {
    #[error("failed to launch engine `{name}`: {reason}")]
    Spawn { name: String, reason: String },
    #[error("engine `{name}` protocol failure: {reason}")]
    Protocol { name: String, reason: String },
    #[error("engine `{name}` exceeded the {limit:?} move budget")]
    MoveTimeout { name: String, limit: Duration },
}

/// Requested more unique candidates than the pool can provide.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot select {requested} unique candidates from a pool of {available}")]
pub struct SelectionError {
    pub requested: usize,
    pub available: usize,
}

/// Failure to write or read a stored model. Fatal: later generations
/// depend on stored state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("model store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt store entry `{path}`: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("cannot decode stored model: {reason}")]
    Decode { reason: String },
}

/// A move was rejected by the board.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("illegal move `{0}`")]
pub struct IllegalMove(pub String);

/// Two models cannot be bred (e.g. different architectures).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot breed models with incompatible architectures")]
pub struct IncompatibleModels;
