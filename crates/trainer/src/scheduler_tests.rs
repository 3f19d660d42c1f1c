use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use baseline_engine::TableModel;
use evo_core::{
    Board, Candidate, Color, Engine, EngineProcessError, EngineProvider, EngineRung, GameStatus,
    IllegalMove, Rules,
};

use crate::catalog::{CatalogRecord, EngineCatalog};
use crate::ladder::LadderConfig;

fn catalog1() -> EngineCatalog {
    EngineCatalog::from_records(vec![CatalogRecord {
        name: "e800".into(),
        rating: 800,
        path: String::new(),
    }])
}

fn generation(size: usize) -> Generation {
    let candidates = (1..=size)
        .map(|i| Candidate::new(format!("model{}", i), Arc::new(TableModel::new(vec![0.0]))))
        .collect();
    Generation {
        index: 0,
        candidates,
        survival_rate: 0.5,
        temperature: 1.0,
    }
}

/// Every game ends immediately with White winning.
#[derive(Clone)]
struct WhiteWinsBoard;

impl Board for WhiteWinsBoard {
    fn legal_moves(&self) -> Vec<String> {
        Vec::new()
    }
    fn apply(&mut self, mv: &str) -> Result<(), IllegalMove> {
        Err(IllegalMove(mv.to_string()))
    }
    fn status(&self) -> GameStatus {
        GameStatus::WhiteWins
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

struct WhiteWinsRules;

impl Rules for WhiteWinsRules {
    fn new_game(&self) -> Box<dyn Board> {
        Box::new(WhiteWinsBoard)
    }
}

struct IdleEngine(String);

impl Engine for IdleEngine {
    fn best_move(
        &mut self,
        _board: &dyn Board,
        _time_limit: Duration,
    ) -> Result<String, EngineProcessError> {
        panic!("no moves expected");
    }
    fn name(&self) -> &str {
        &self.0
    }
    fn quit(&mut self) -> Result<(), EngineProcessError> {
        Ok(())
    }
}

/// Fails the first `fail_first` launches, serves the rest.
struct FlakyProvider {
    launches: AtomicUsize,
    fail_first: usize,
}

impl EngineProvider for FlakyProvider {
    fn launch(&self, rung: &EngineRung) -> Result<Box<dyn Engine>, EngineProcessError> {
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(EngineProcessError::Spawn {
                name: rung.name.clone(),
                reason: "spawn refused".to_string(),
            });
        }
        Ok(Box::new(IdleEngine(rung.name.clone())))
    }
}

#[test]
fn every_candidate_is_scored() {
    // White always wins: each candidate wins as White (+10), loses as
    // Black, ending Defeated at rung 0 with 10 points.
    let catalog = catalog1();
    let rules = WhiteWinsRules;
    let provider = FlakyProvider {
        launches: AtomicUsize::new(0),
        fail_first: 0,
    };
    let ladder = crate::ladder::TournamentLadder::new(
        &catalog,
        &provider,
        &rules,
        LadderConfig::default(),
    );

    let mut generation = generation(5);
    let scheduler = TournamentScheduler::new(2).unwrap();
    scheduler.run_generation(&mut generation, &ladder);

    for candidate in &generation.candidates {
        assert_eq!(candidate.score, 10.0);
        assert_eq!(candidate.reached_rung, 0);
    }
}

#[test]
fn failures_are_isolated_to_one_candidate() {
    let catalog = catalog1();
    let rules = WhiteWinsRules;
    // Exactly one launch fails; one candidate aborts with score 0, the
    // others finish normally.
    let provider = FlakyProvider {
        launches: AtomicUsize::new(0),
        fail_first: 1,
    };
    let ladder = crate::ladder::TournamentLadder::new(
        &catalog,
        &provider,
        &rules,
        LadderConfig::default(),
    );

    let mut generation = generation(4);
    let scheduler = TournamentScheduler::new(2).unwrap();
    scheduler.run_generation(&mut generation, &ladder);

    let mut scores: Vec<f64> = generation.candidates.iter().map(|c| c.score).collect();
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(scores, vec![0.0, 10.0, 10.0, 10.0]);
    // Names still line up with their own results.
    assert_eq!(generation.len(), 4);
}

#[test]
fn zero_workers_is_rejected() {
    // rayon treats 0 as "use default"; the config layer forbids it before
    // a scheduler is ever built.
    let config = crate::config::TrainingConfig {
        workers: 0,
        ..minimal_config()
    };
    assert!(config.validate().is_err());
}

fn minimal_config() -> crate::config::TrainingConfig {
    toml::from_str(
        r#"
        population_size = 4
        survival_rate = 0.5
        mutation_rate = 0.3
        temperature = 1.0
        decay_rate = 0.05
        level_up_threshold = 0.6
        stagnation_limit = 5
    "#,
    )
    .unwrap()
}
