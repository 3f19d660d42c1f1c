//! The model store: archives every generation's candidates and loads them
//! back for resumption.
//!
//! The orchestration core depends only on the [`ModelStore`] trait; the
//! filesystem layout below is one implementation of it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use evo_core::{Candidate, ModelCodec, PersistenceError};

/// Persistent archive of candidates, keyed by generation.
pub trait ModelStore: Send + Sync {
    /// Archive one candidate of `generation`.
    fn put(&self, generation: u64, candidate: &Candidate) -> Result<(), PersistenceError>;

    /// All candidates archived for `generation`, with their stored scores.
    /// A generation that was never written lists as empty.
    fn list(&self, generation: u64) -> Result<Vec<Candidate>, PersistenceError>;
}

/// Filesystem store: one directory per generation, one file per candidate
/// named `<name>_<score formatted to 2 decimals>.<ext>`. Loading splits the
/// file name on the last underscore to recover name and score.
pub struct FsModelStore {
    root: PathBuf,
    codec: Box<dyn ModelCodec>,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>, codec: Box<dyn ModelCodec>) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    fn generation_dir(&self, generation: u64) -> PathBuf {
        self.root.join(format!("generation{}", generation))
    }

    fn io_err(path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl ModelStore for FsModelStore {
    fn put(&self, generation: u64, candidate: &Candidate) -> Result<(), PersistenceError> {
        let dir = self.generation_dir(generation);
        std::fs::create_dir_all(&dir).map_err(|e| Self::io_err(&dir, e))?;

        let file = dir.join(format!(
            "{}_{:.2}.{}",
            candidate.name,
            candidate.score,
            self.codec.extension()
        ));
        std::fs::write(&file, candidate.model.serialize()).map_err(|e| Self::io_err(&file, e))?;
        debug!("archived {} to {}", candidate.name, file.display());
        Ok(())
    }

    fn list(&self, generation: u64) -> Result<Vec<Candidate>, PersistenceError> {
        let dir = self.generation_dir(generation);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(&dir, e)),
        };

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_err(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.codec.extension()) {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| PersistenceError::Corrupt {
                    path: path.display().to_string(),
                    reason: "file name is not valid UTF-8".to_string(),
                })?;
            let (name, score_text) =
                stem.rsplit_once('_').ok_or_else(|| PersistenceError::Corrupt {
                    path: path.display().to_string(),
                    reason: "expected `<name>_<score>` file name".to_string(),
                })?;
            let score: f64 = score_text.parse().map_err(|_| PersistenceError::Corrupt {
                path: path.display().to_string(),
                reason: format!("`{}` is not a score", score_text),
            })?;

            let bytes = std::fs::read(&path).map_err(|e| Self::io_err(&path, e))?;
            let model = self.codec.decode(&bytes)?;

            let mut candidate = Candidate::new(name, Arc::from(model));
            candidate.score = score;
            candidates.push(candidate);
        }

        // Directory iteration order is platform-defined.
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(candidates)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
