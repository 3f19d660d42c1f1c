//! The tournament ladder: one candidate against increasingly strong
//! opponents until defeated or the catalog is exhausted.

use std::time::Duration;

use log::{debug, warn};

use evo_core::{
    Board, Candidate, Color, Engine, EngineProcessError, EngineRung, GameStatus, LadderRun,
    Model, Rules, Termination,
};

use crate::catalog::EngineCatalog;
use crate::transcript::TranscriptWriter;

/// Per-game limits applied to every ladder game.
#[derive(Debug, Clone)]
pub struct LadderConfig {
    /// Time budget handed to the engine for each move.
    pub move_time: Duration,
    /// Move count guard; longer games are declared draws.
    pub max_moves: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            move_time: Duration::from_millis(1000),
            max_moves: 200,
        }
    }
}

/// Result of one rung attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RungOutcome {
    /// Both colors completed without a loss; points earned at this rung.
    Advanced(f64),
    /// The run stops here, with the points earned at this rung so far.
    Halted(Termination, f64),
}

/// Runs candidates up the opponent ladder.
///
/// Per rung the candidate plays one game as White and, if not defeated, one
/// as Black. A win scores +10, a draw +1; a loss ends the whole run at once.
/// Engine handles are acquired per rung attempt and quit on every exit path.
pub struct TournamentLadder<'a> {
    catalog: &'a EngineCatalog,
    provider: &'a dyn evo_core::EngineProvider,
    rules: &'a dyn Rules,
    transcripts: Option<&'a TranscriptWriter>,
    config: LadderConfig,
}

impl<'a> TournamentLadder<'a> {
    pub fn new(
        catalog: &'a EngineCatalog,
        provider: &'a dyn evo_core::EngineProvider,
        rules: &'a dyn Rules,
        config: LadderConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            rules,
            transcripts: None,
            config,
        }
    }

    /// Record every completed game as a PGN transcript.
    pub fn with_transcripts(mut self, writer: &'a TranscriptWriter) -> Self {
        self.transcripts = Some(writer);
        self
    }

    /// Run `candidate` from `start_rung` upward until defeated, aborted, or
    /// past the last rung.
    pub fn run(&self, candidate: &Candidate, generation: u64, start_rung: usize) -> LadderRun {
        let mut score = 0.0;
        let mut rung_index = start_rung;
        let max_index = self.catalog.max_index();

        while rung_index <= max_index {
            let rung = match self.catalog.rung(rung_index) {
                Ok(rung) => rung,
                Err(e) => {
                    // Catalog failures mid-run are isolated to this candidate.
                    warn!("{}: catalog lookup failed: {}", candidate.name, e);
                    return LadderRun {
                        score,
                        reached_rung: rung_index,
                        termination: Termination::Aborted,
                    };
                }
            };

            match self.play_rung(candidate, generation, rung) {
                RungOutcome::Advanced(points) => {
                    score += points;
                    rung_index += 1;
                }
                RungOutcome::Halted(termination, points) => {
                    score += points;
                    return LadderRun {
                        score,
                        reached_rung: rung_index,
                        termination,
                    };
                }
            }
        }

        LadderRun {
            score,
            reached_rung: max_index + 1,
            termination: Termination::Exhausted,
        }
    }

    /// One rung attempt: White then Black against a freshly launched engine.
    fn play_rung(&self, candidate: &Candidate, generation: u64, rung: &EngineRung) -> RungOutcome {
        let mut engine = match self.provider.launch(rung) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("{}: {}", candidate.name, e);
                return RungOutcome::Halted(Termination::Aborted, 0.0);
            }
        };

        let mut points = 0.0;
        for color in [Color::White, Color::Black] {
            match self.play_game(candidate.model.as_ref(), engine.as_mut(), color) {
                Ok((status, moves)) => {
                    self.save_transcript(generation, &candidate.name, rung, color, &moves, status);
                    if status.is_win_for(color) {
                        points += 10.0;
                    } else if status == GameStatus::Draw {
                        points += 1.0;
                    } else {
                        debug!(
                            "{} defeated by {} as {}",
                            candidate.name,
                            rung.name,
                            color.as_str()
                        );
                        release(engine.as_mut());
                        return RungOutcome::Halted(Termination::Defeated, points);
                    }
                }
                Err(e) => {
                    warn!("{}: {}", candidate.name, e);
                    release(engine.as_mut());
                    return RungOutcome::Halted(Termination::Aborted, points);
                }
            }
        }

        release(engine.as_mut());
        RungOutcome::Advanced(points)
    }

    /// Play one game to completion. Returns the final status and the move
    /// list in play order.
    fn play_game(
        &self,
        model: &dyn Model,
        engine: &mut dyn Engine,
        color: Color,
    ) -> Result<(GameStatus, Vec<String>), EngineProcessError> {
        let mut board = self.rules.new_game();
        let mut moves: Vec<String> = Vec::new();

        loop {
            let status = board.status();
            if status != GameStatus::Ongoing {
                return Ok((status, moves));
            }
            if moves.len() as u32 >= self.config.max_moves {
                return Ok((GameStatus::Draw, moves));
            }

            if board.side_to_move() == color {
                match pick_move(model, board.as_ref()) {
                    Some((mv, next)) => {
                        board = next;
                        moves.push(mv);
                    }
                    // No legal move while the game is still open: treat as
                    // a stalemate-style draw.
                    None => return Ok((GameStatus::Draw, moves)),
                }
            } else {
                let mv = engine.best_move(board.as_ref(), self.config.move_time)?;
                board.apply(&mv).map_err(|e| EngineProcessError::Protocol {
                    name: engine.name().to_string(),
                    reason: e.to_string(),
                })?;
                moves.push(mv);
            }
        }
    }

    fn save_transcript(
        &self,
        generation: u64,
        candidate: &str,
        rung: &EngineRung,
        color: Color,
        moves: &[String],
        status: GameStatus,
    ) {
        if let Some(writer) = self.transcripts {
            if let Err(e) = writer.write_game(generation, candidate, &rung.name, color, moves, status)
            {
                // Transcripts are a record, not training state; keep playing.
                warn!("failed to write transcript for {}: {}", candidate, e);
            }
        }
    }
}

/// Greedy move choice: evaluate the position after every legal move and
/// play the best-scoring one. Ties go to the first-encountered move, so the
/// board's stable move order decides.
fn pick_move(model: &dyn Model, board: &dyn Board) -> Option<(String, Box<dyn Board>)> {
    let mut best: Option<(String, Box<dyn Board>, f64)> = None;
    for mv in board.legal_moves() {
        let mut next = board.clone_box();
        if next.apply(&mv).is_err() {
            continue;
        }
        let value = model.evaluate(next.as_ref());
        if best.as_ref().map_or(true, |(_, _, b)| value > *b) {
            best = Some((mv, next, value));
        }
    }
    best.map(|(mv, next, _)| (mv, next))
}

fn release(engine: &mut dyn Engine) {
    if let Err(e) = engine.quit() {
        warn!("failed to quit engine {}: {}", engine.name(), e);
    }
}

#[cfg(test)]
#[path = "ladder_tests.rs"]
mod ladder_tests;
