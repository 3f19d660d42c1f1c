//! A rating-scaled opponent engine and its provider.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use evo_core::{Board, Engine, EngineProcessError, EngineProvider, EngineRung};

/// Rating at which the baseline engine plays its heuristic on every move.
const PERFECT_RATING: f64 = 2000.0;

/// An engine whose strength scales with its catalog rating.
///
/// With probability `rating / 2000` it plays a move that leaves the opponent
/// in a position flagged as lost by the board's feature encoding (feature 1);
/// otherwise it plays the first legal move. Seeded from the rating so runs
/// are reproducible.
pub struct BaselineEngine {
    name: String,
    skill: f64,
    rng: StdRng,
    alive: bool,
}

impl BaselineEngine {
    pub fn new(name: impl Into<String>, rating: i32) -> Self {
        Self {
            name: name.into(),
            skill: (rating.max(0) as f64 / PERFECT_RATING).min(1.0),
            rng: StdRng::seed_from_u64(rating.max(0) as u64),
            alive: true,
        }
    }

    fn heuristic_move(&self, board: &dyn Board, legal: &[String]) -> Option<String> {
        legal.iter().cloned().find(|mv| {
            let mut next = board.clone_box();
            next.apply(mv).is_ok() && next.features().get(1).copied() == Some(1.0)
        })
    }
}

impl Engine for BaselineEngine {
    fn best_move(
        &mut self,
        board: &dyn Board,
        _time_limit: Duration,
    ) -> Result<String, EngineProcessError> {
        if !self.alive {
            return Err(EngineProcessError::Protocol {
                name: self.name.clone(),
                reason: "engine already quit".to_string(),
            });
        }
        let legal = board.legal_moves();
        if legal.is_empty() {
            return Err(EngineProcessError::Protocol {
                name: self.name.clone(),
                reason: "asked for a move with no legal moves".to_string(),
            });
        }
        if self.rng.gen::<f64>() < self.skill {
            if let Some(mv) = self.heuristic_move(board, &legal) {
                return Ok(mv);
            }
        }
        Ok(legal[0].clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn quit(&mut self) -> Result<(), EngineProcessError> {
        self.alive = false;
        Ok(())
    }
}

/// Launches a [`BaselineEngine`] per rung, ignoring the executable path.
#[derive(Debug, Clone, Default)]
pub struct BaselineProvider;

impl EngineProvider for BaselineProvider {
    fn launch(&self, rung: &EngineRung) -> Result<Box<dyn Engine>, EngineProcessError> {
        Ok(Box::new(BaselineEngine::new(rung.name.clone(), rung.rating)))
    }
}
