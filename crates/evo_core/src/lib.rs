//! Core types for the evolutionary chess trainer.
//!
//! This crate defines:
//! - The data model shared by the orchestration layer: candidates,
//!   generations, ladder rungs and ladder run records.
//! - The capability traits the trainer drives but does not implement:
//!   scoring models, chess engines, and game state. Concrete
//!   implementations (real chess rules, UCI engine processes, neural
//!   network models) plug in behind these traits.
//! - The error types shared across crates.

pub mod errors;
pub mod traits;
pub mod types;

pub use errors::*;
pub use traits::*;
pub use types::*;
