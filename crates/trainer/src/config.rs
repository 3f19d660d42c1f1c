//! Training configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Missing or invalid settings. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Full configuration surface of a training run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    pub population_size: usize,
    /// Fraction of the population carried unchanged into the next
    /// generation. Decays each generation, floored at 0.01.
    pub survival_rate: f64,
    /// Probability that a fill slot is produced by mutation rather than
    /// breeding.
    pub mutation_rate: f64,
    /// Mutation magnitude. Decays each generation, floored at 0.01.
    pub temperature: f64,
    /// Per-generation multiplicative reduction of survival rate and
    /// temperature.
    pub decay_rate: f64,
    /// Minimum fraction of the population that must clear a rung before
    /// the skill level advances.
    pub level_up_threshold: f64,
    /// Hard cap on generations; 0 means unbounded.
    #[serde(default)]
    pub max_generations: u64,
    /// Consecutive stagnant generations tolerated before stopping.
    pub stagnation_limit: u32,

    /// Worker pool size for concurrent ladder runs.
    #[serde(default = "defaults::workers")]
    pub workers: usize,
    /// Per-game move count guard; longer games are declared draws.
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u32,
    /// Per-move time budget handed to engines, in milliseconds.
    #[serde(default = "defaults::move_time_ms")]
    pub move_time_ms: u64,

    /// Optional serialized model to seed the initial population from.
    #[serde(default)]
    pub base_model_path: Option<PathBuf>,
    /// Optional hidden layer sizes for freshly seeded models.
    #[serde(default)]
    pub custom_architecture: Option<Vec<usize>>,

    #[serde(default = "defaults::catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "defaults::models_dir")]
    pub models_dir: PathBuf,
    #[serde(default = "defaults::results_dir")]
    pub results_dir: PathBuf,
}

mod defaults {
    use std::path::PathBuf;

    pub fn workers() -> usize {
        4
    }
    pub fn max_moves() -> u32 {
        200
    }
    pub fn move_time_ms() -> u64 {
        1000
    }
    pub fn catalog_path() -> PathBuf {
        PathBuf::from("engines/catalog.json")
    }
    pub fn models_dir() -> PathBuf {
        PathBuf::from("models")
    }
    pub fn results_dir() -> PathBuf {
        PathBuf::from("results")
    }
}

impl TrainingConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: TrainingConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.population_size < 2 {
            return Err(invalid("population_size", "must be at least 2"));
        }
        if !(self.survival_rate > 0.0 && self.survival_rate <= 1.0) {
            return Err(invalid("survival_rate", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(invalid("mutation_rate", "must be in [0, 1]"));
        }
        if self.temperature <= 0.0 {
            return Err(invalid("temperature", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.decay_rate) {
            return Err(invalid("decay_rate", "must be in [0, 1)"));
        }
        if !(self.level_up_threshold > 0.0 && self.level_up_threshold <= 1.0) {
            return Err(invalid("level_up_threshold", "must be in (0, 1]"));
        }
        if self.stagnation_limit == 0 {
            return Err(invalid("stagnation_limit", "must be at least 1"));
        }
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if self.max_moves == 0 {
            return Err(invalid("max_moves", "must be at least 1"));
        }
        if self.move_time_ms == 0 {
            return Err(invalid("move_time_ms", "must be at least 1"));
        }
        if let Some(layers) = &self.custom_architecture {
            if layers.is_empty() || layers.contains(&0) {
                return Err(invalid(
                    "custom_architecture",
                    "layer sizes must be non-empty and positive",
                ));
            }
        }
        Ok(())
    }

    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }
}
