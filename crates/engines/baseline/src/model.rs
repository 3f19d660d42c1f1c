//! A linear table model implementing the `Model` capability.

use std::any::Any;
use std::path::Path;

use rand::{Rng, RngCore};

use evo_core::{Board, IncompatibleModels, Model, ModelCodec, ModelFactory, PersistenceError};

/// Weight count for freshly seeded models.
pub const DEFAULT_WEIGHTS: usize = 8;

/// Scores positions as a dot product of board features and a weight table.
///
/// Mutation perturbs a temperature-scaled fraction of the weights by a
/// temperature-scaled amount; breeding averages two tables of equal size.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    weights: Vec<f64>,
}

impl TableModel {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Fresh model with small random weights.
    pub fn random(len: usize, rng: &mut dyn RngCore) -> Self {
        let weights = (0..len).map(|_| rng.gen_range(-0.1..0.1)).collect();
        Self { weights }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Model for TableModel {
    fn evaluate(&self, board: &dyn Board) -> f64 {
        board
            .features()
            .iter()
            .zip(&self.weights)
            .map(|(f, w)| f * w)
            .sum()
    }

    fn mutate(&self, temperature: f64, rng: &mut dyn RngCore) -> Box<dyn Model> {
        let mut weights = self.weights.clone();
        let len = weights.len();
        if len > 0 {
            let touched = ((temperature * len as f64) as usize).clamp(1, len);
            for idx in rand::seq::index::sample(rng, len, touched) {
                weights[idx] += rng.gen_range(-1.0..=1.0) * temperature;
            }
        }
        Box::new(TableModel { weights })
    }

    fn breed(&self, other: &dyn Model) -> Result<Box<dyn Model>, IncompatibleModels> {
        let other = other
            .as_any()
            .downcast_ref::<TableModel>()
            .ok_or(IncompatibleModels)?;
        if other.weights.len() != self.weights.len() {
            return Err(IncompatibleModels);
        }
        let weights = self
            .weights
            .iter()
            .zip(&other.weights)
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        Ok(Box::new(TableModel { weights }))
    }

    fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.weights.len() * 8);
        for w in &self.weights {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads table models back from their serialized form.
#[derive(Debug, Clone, Default)]
pub struct TableCodec;

impl ModelCodec for TableCodec {
    fn extension(&self) -> &str {
        "tbl"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Model>, PersistenceError> {
        if bytes.len() % 8 != 0 {
            return Err(PersistenceError::Decode {
                reason: format!("weight table length {} is not a multiple of 8", bytes.len()),
            });
        }
        let weights = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect();
        Ok(Box::new(TableModel::new(weights)))
    }
}

/// Seeds fresh table models for population bootstrap.
#[derive(Debug, Clone)]
pub struct TableModelFactory {
    default_len: usize,
}

impl TableModelFactory {
    pub fn new(default_len: usize) -> Self {
        Self { default_len }
    }
}

impl Default for TableModelFactory {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS)
    }
}

impl ModelFactory for TableModelFactory {
    fn fresh(&self, rng: &mut dyn RngCore) -> Box<dyn Model> {
        Box::new(TableModel::random(self.default_len, rng))
    }

    fn with_architecture(&self, hidden: &[usize], rng: &mut dyn RngCore) -> Box<dyn Model> {
        let len = hidden.iter().sum::<usize>().max(1);
        Box::new(TableModel::random(len, rng))
    }

    fn from_base(
        &self,
        path: &Path,
        rng: &mut dyn RngCore,
    ) -> Result<Box<dyn Model>, PersistenceError> {
        let bytes = std::fs::read(path).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let base = TableCodec.decode(&bytes)?;
        let base = base
            .as_any()
            .downcast_ref::<TableModel>()
            .ok_or_else(|| PersistenceError::Decode {
                reason: "base model is not a weight table".to_string(),
            })?;
        let weights = base
            .weights()
            .iter()
            .map(|w| w + rng.gen_range(-0.01..0.01))
            .collect();
        Ok(Box::new(TableModel::new(weights)))
    }
}
