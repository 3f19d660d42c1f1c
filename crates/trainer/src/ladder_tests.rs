use super::*;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use baseline_engine::{NimRules, TableModel};
use evo_core::{EngineProvider, IllegalMove};

use crate::catalog::CatalogRecord;

fn catalog3() -> EngineCatalog {
    EngineCatalog::from_records(vec![
        CatalogRecord {
            name: "e800".into(),
            rating: 800,
            path: String::new(),
        },
        CatalogRecord {
            name: "e1200".into(),
            rating: 1200,
            path: String::new(),
        },
        CatalogRecord {
            name: "e1600".into(),
            rating: 1600,
            path: String::new(),
        },
    ])
}

fn candidate() -> Candidate {
    Candidate::new("model1", Arc::new(TableModel::new(vec![0.0; 4])))
}

/// Board that is already finished when handed out; no moves are played.
#[derive(Clone)]
struct FinishedBoard {
    status: GameStatus,
}

impl Board for FinishedBoard {
    fn legal_moves(&self) -> Vec<String> {
        Vec::new()
    }
    fn apply(&mut self, mv: &str) -> Result<(), IllegalMove> {
        Err(IllegalMove(mv.to_string()))
    }
    fn status(&self) -> GameStatus {
        self.status
    }
    fn side_to_move(&self) -> Color {
        Color::White
    }
    fn features(&self) -> Vec<f64> {
        Vec::new()
    }
    fn clone_box(&self) -> Box<dyn Board> {
        Box::new(self.clone())
    }
}

/// Hands out pre-scripted game results, in order.
struct ScriptedRules {
    statuses: Mutex<VecDeque<GameStatus>>,
}

impl ScriptedRules {
    fn new(statuses: Vec<GameStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
        }
    }
}

impl Rules for ScriptedRules {
    fn new_game(&self) -> Box<dyn Board> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted scenario ran out of games");
        Box::new(FinishedBoard { status })
    }
}

struct CountingEngine {
    name: String,
    quits: Arc<AtomicUsize>,
    fail_moves: bool,
}

impl Engine for CountingEngine {
    fn best_move(
        &mut self,
        _board: &dyn Board,
        _time_limit: Duration,
    ) -> Result<String, EngineProcessError> {
        if self.fail_moves {
            Err(EngineProcessError::Protocol {
                name: self.name.clone(),
                reason: "connection lost".to_string(),
            })
        } else {
            panic!("engine was asked to move in a scripted game");
        }
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn quit(&mut self) -> Result<(), EngineProcessError> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountingProvider {
    launches: AtomicUsize,
    quits: Arc<AtomicUsize>,
    fail_launch_at: Option<usize>,
    fail_moves: bool,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            launches: AtomicUsize::new(0),
            quits: Arc::new(AtomicUsize::new(0)),
            fail_launch_at: None,
            fail_moves: false,
        }
    }
}

impl EngineProvider for CountingProvider {
    fn launch(&self, rung: &evo_core::EngineRung) -> Result<Box<dyn Engine>, EngineProcessError> {
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch_at == Some(n) {
            return Err(EngineProcessError::Spawn {
                name: rung.name.clone(),
                reason: "executable missing".to_string(),
            });
        }
        Ok(Box::new(CountingEngine {
            name: rung.name.clone(),
            quits: Arc::clone(&self.quits),
            fail_moves: self.fail_moves,
        }))
    }
}

#[test]
fn defeat_on_second_color_keeps_first_color_points() {
    // Rung 0: win as White, win as Black (+20). Rung 1: draw as White (+1),
    // lose as Black -> run ends at rung 1 with 21 points.
    let rules = ScriptedRules::new(vec![
        GameStatus::WhiteWins,
        GameStatus::BlackWins,
        GameStatus::Draw,
        GameStatus::WhiteWins,
    ]);
    let catalog = catalog3();
    let provider = CountingProvider::new();
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 0);

    assert_eq!(run.score, 21.0);
    assert_eq!(run.reached_rung, 1);
    assert_eq!(run.termination, Termination::Defeated);
    // Both launched engines were quit, including on the defeat path.
    assert_eq!(provider.launches.load(Ordering::SeqCst), 2);
    assert_eq!(provider.quits.load(Ordering::SeqCst), 2);
}

#[test]
fn loss_as_white_skips_black_game() {
    let rules = ScriptedRules::new(vec![GameStatus::BlackWins]);
    let catalog = catalog3();
    let provider = CountingProvider::new();
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 0);

    assert_eq!(run.score, 0.0);
    assert_eq!(run.reached_rung, 0);
    assert_eq!(run.termination, Termination::Defeated);
    // The scripted queue had exactly one game and was not over-consumed.
    assert_eq!(provider.quits.load(Ordering::SeqCst), 1);
}

#[test]
fn clearing_every_rung_exhausts_the_catalog() {
    let rules = ScriptedRules::new(vec![
        GameStatus::WhiteWins,
        GameStatus::BlackWins,
        GameStatus::WhiteWins,
        GameStatus::BlackWins,
        GameStatus::WhiteWins,
        GameStatus::BlackWins,
    ]);
    let catalog = catalog3();
    let provider = CountingProvider::new();
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 0);

    assert_eq!(run.score, 60.0);
    assert_eq!(run.reached_rung, 3);
    assert_eq!(run.termination, Termination::Exhausted);
    assert_eq!(provider.quits.load(Ordering::SeqCst), 3);
}

#[test]
fn launch_failure_aborts_preserving_score_and_rung() {
    let rules = ScriptedRules::new(vec![GameStatus::WhiteWins, GameStatus::BlackWins]);
    let catalog = catalog3();
    let mut provider = CountingProvider::new();
    provider.fail_launch_at = Some(1);
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 0);

    assert_eq!(run.score, 20.0);
    assert_eq!(run.reached_rung, 1);
    assert_eq!(run.termination, Termination::Aborted);
}

#[test]
fn engine_failure_mid_game_aborts_not_defeats() {
    // Real rules this time: the candidate moves first, then the engine's
    // reply fails.
    let rules = NimRules;
    let catalog = catalog3();
    let mut provider = CountingProvider::new();
    provider.fail_moves = true;
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 0);

    assert_eq!(run.termination, Termination::Aborted);
    assert_eq!(run.reached_rung, 0);
    assert_eq!(run.score, 0.0);
    // The failing engine was still quit.
    assert_eq!(provider.quits.load(Ordering::SeqCst), 1);
}

#[test]
fn start_rung_offsets_the_climb() {
    let rules = ScriptedRules::new(vec![GameStatus::BlackWins]);
    let catalog = catalog3();
    let provider = CountingProvider::new();
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default());

    let run = ladder.run(&candidate(), 0, 2);

    assert_eq!(run.reached_rung, 2);
    assert_eq!(run.termination, Termination::Defeated);
}

#[test]
fn transcripts_written_per_rung_and_color() {
    let dir = tempfile::tempdir().unwrap();
    let writer = TranscriptWriter::new(dir.path());

    let rules = ScriptedRules::new(vec![
        GameStatus::WhiteWins,
        GameStatus::BlackWins,
        GameStatus::BlackWins, // candidate loses as White at rung 1
    ]);
    let catalog = catalog3();
    let provider = CountingProvider::new();
    let ladder = TournamentLadder::new(&catalog, &provider, &rules, LadderConfig::default())
        .with_transcripts(&writer);

    let run = ladder.run(&candidate(), 3, 0);
    assert_eq!(run.termination, Termination::Defeated);

    let base = dir.path().join("generation3").join("model1");
    assert!(base.join("e800_white.pgn").is_file());
    assert!(base.join("e800_black.pgn").is_file());
    assert!(base.join("e1200_white.pgn").is_file());
    assert!(!base.join("e1200_black.pgn").exists());
}
