//! Skill-level advancement and stagnation tracking: decides when the
//! outer training loop stops.

use std::fmt;

use log::info;

use evo_core::Generation;

/// Why a training run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// No score improvement or level-up for the configured number of
    /// consecutive generations.
    Stagnated { generations: u32 },
    /// The configured generation cap was reached.
    GenerationLimit { limit: u64 },
    /// A candidate won every game on the ladder.
    FullClear { candidate: String, score: f64 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Stagnated { generations } => {
                write!(f, "stagnated for {} generations", generations)
            }
            StopReason::GenerationLimit { limit } => {
                write!(f, "reached the {}-generation limit", limit)
            }
            StopReason::FullClear { candidate, score } => {
                write!(f, "{} cleared the full ladder with {:.1} points", candidate, score)
            }
        }
    }
}

/// Fixed-point level computation over a frozen generation snapshot.
///
/// Advances one level at a time while at least `threshold` of the
/// population has reached past the current level, bounded by the catalog
/// height. Pure: identical inputs always produce identical output.
pub fn level_up(
    generation: &Generation,
    current_level: usize,
    threshold: f64,
    max_level: usize,
) -> usize {
    if generation.is_empty() {
        return current_level;
    }
    let population = generation.len() as f64;
    let mut level = current_level;
    while level < max_level {
        let cleared = generation
            .candidates
            .iter()
            .filter(|c| c.reached_rung >= level + 1)
            .count();
        if cleared as f64 / population >= threshold {
            level += 1;
        } else {
            break;
        }
    }
    level
}

/// Tracks level advancement and stagnation across generations.
pub struct ProgressionController {
    threshold: f64,
    stagnation_limit: u32,
    /// 0 means unbounded.
    max_generations: u64,
    /// Catalog height: the highest level candidates can clear.
    max_level: usize,
    full_clear_score: f64,

    level: usize,
    stagnation: u32,
    previous_total: Option<f64>,
    last_level_up: Option<u64>,
}

impl ProgressionController {
    pub fn new(
        threshold: f64,
        stagnation_limit: u32,
        max_generations: u64,
        catalog_size: usize,
    ) -> Self {
        Self {
            threshold,
            stagnation_limit,
            max_generations,
            max_level: catalog_size,
            full_clear_score: catalog_size as f64 * 20.0,
            level: 0,
            stagnation: 0,
            previous_total: None,
            last_level_up: None,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    /// Fold a freshly scored generation into the progression state.
    pub fn observe(&mut self, generation: &Generation) {
        let new_level = level_up(generation, self.level, self.threshold, self.max_level);
        if new_level > self.level {
            info!(
                "generation {}: level up {} -> {}",
                generation.index, self.level, new_level
            );
            self.last_level_up = Some(generation.index);
            self.level = new_level;
        }

        let total = generation.total_score();
        let improved = self.previous_total.map_or(true, |prev| total > prev);
        let recent_level_up = self
            .last_level_up
            .map_or(false, |g| generation.index - g < self.stagnation_limit as u64);

        if improved || recent_level_up {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
            info!(
                "generation {}: stagnant ({} of {})",
                generation.index, self.stagnation, self.stagnation_limit
            );
        }
        self.previous_total = Some(total);
    }

    /// Whether training should stop after the given scored generation.
    pub fn should_stop(&self, generation: &Generation) -> Option<StopReason> {
        if let Some(best) = generation.best() {
            if best.score >= self.full_clear_score && self.full_clear_score > 0.0 {
                return Some(StopReason::FullClear {
                    candidate: best.name.clone(),
                    score: best.score,
                });
            }
        }
        if self.stagnation >= self.stagnation_limit {
            return Some(StopReason::Stagnated {
                generations: self.stagnation,
            });
        }
        if self.max_generations > 0 && generation.index + 1 >= self.max_generations {
            return Some(StopReason::GenerationLimit {
                limit: self.max_generations,
            });
        }
        None
    }
}
