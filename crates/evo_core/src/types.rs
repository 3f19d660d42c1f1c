//! Data model for populations, ladders and their results.

use std::fmt;
use std::sync::Arc;

use crate::traits::Model;

/// Side to move in a two-player game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Lowercase name as used in transcript file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

/// Outcome of a game in progress or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameStatus {
    /// Result tag in PGN notation (`*` while ongoing).
    pub fn pgn_result(self) -> &'static str {
        match self {
            GameStatus::Ongoing => "*",
            GameStatus::WhiteWins => "1-0",
            GameStatus::BlackWins => "0-1",
            GameStatus::Draw => "1/2-1/2",
        }
    }

    /// Whether `color` won a finished game.
    pub fn is_win_for(self, color: Color) -> bool {
        matches!(
            (self, color),
            (GameStatus::WhiteWins, Color::White) | (GameStatus::BlackWins, Color::Black)
        )
    }
}

/// One step of the opponent ladder: an engine, its strength rating and its
/// position in the catalog. Rungs are totally ordered by ascending rating;
/// rung 0 is the weakest opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRung {
    pub name: String,
    pub rating: i32,
    pub path: String,
    /// 0-based ordinal within the catalog.
    pub index: usize,
}

/// Why a ladder run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The candidate lost a game; the run stops at that rung.
    Defeated,
    /// The candidate cleared every rung in the catalog.
    Exhausted,
    /// Engine communication failed; not a defeat, score is kept.
    Aborted,
}

/// Record of one candidate's trip up the ladder in one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderRun {
    pub score: f64,
    pub reached_rung: usize,
    pub termination: Termination,
}

/// How a candidate came to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lineage {
    /// Created at population initialization.
    Seed,
    /// Mutated copy of `parent`; `mutations` counts the chain length.
    Mutation { parent: String, mutations: u32 },
    /// Bred from two parents.
    Breeding { parents: [String; 2] },
}

/// One scoring model plus its identity, per-generation score and lineage.
///
/// The model handle is shared (`Arc`) because a survivor is carried unchanged
/// into the next generation while also serving as a mutation/breeding parent;
/// models are immutable after creation, so sharing is sound.
#[derive(Clone)]
pub struct Candidate {
    pub name: String,
    pub model: Arc<dyn Model>,
    pub score: f64,
    pub reached_rung: usize,
    pub lineage: Lineage,
}

impl Candidate {
    pub fn new(name: impl Into<String>, model: Arc<dyn Model>) -> Self {
        Self::with_lineage(name, model, Lineage::Seed)
    }

    pub fn with_lineage(name: impl Into<String>, model: Arc<dyn Model>, lineage: Lineage) -> Self {
        Self {
            name: name.into(),
            model,
            score: 0.0,
            reached_rung: 0,
            lineage,
        }
    }

    /// Number of mutations recorded in this candidate's lineage.
    pub fn mutation_count(&self) -> u32 {
        match &self.lineage {
            Lineage::Mutation { mutations, .. } => *mutations,
            _ => 0,
        }
    }

    /// Store the outcome of a ladder run on the candidate.
    pub fn record_run(&mut self, run: &LadderRun) {
        self.score = run.score;
        self.reached_rung = run.reached_rung;
    }

    /// Copy carried into the next generation: same model and lineage,
    /// score and reached rung reset.
    pub fn carried_forward(&self) -> Candidate {
        Candidate {
            name: self.name.clone(),
            model: Arc::clone(&self.model),
            score: 0.0,
            reached_rung: 0,
            lineage: self.lineage.clone(),
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("score", &self.score)
            .field("reached_rung", &self.reached_rung)
            .field("lineage", &self.lineage)
            .finish()
    }
}

/// A fixed-size population evaluated together under one set of evolutionary
/// parameters.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Monotonically increasing generation number, starting at 0.
    pub index: u64,
    pub candidates: Vec<Candidate>,
    /// Survival rate in effect for this generation.
    pub survival_rate: f64,
    /// Mutation temperature in effect for this generation.
    pub temperature: f64,
}

impl Generation {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn total_score(&self) -> f64 {
        self.candidates.iter().map(|c| c.score).sum()
    }

    /// Best-scoring candidate, if any.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Sort candidates by score, best first.
    pub fn sort_by_score_desc(&mut self) {
        self.candidates
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }
}
