//! The opponent engine catalog: an ordered table of engines, sorted
//! ascending by strength rating and addressed by 0-based rung index.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use evo_core::EngineRung;

/// Index out of range or name not found. Fatal to the ladder run issuing it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog {path} lists no engines")]
    Empty { path: String },
    #[error("rung index {index} out of range (catalog has {len} engines)")]
    OutOfRange { index: usize, len: usize },
    #[error("engine `{0}` not found in catalog")]
    UnknownEngine(String),
}

/// On-disk catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: String,
    pub rating: i32,
    pub path: String,
}

/// The ordered opponent ladder.
#[derive(Debug, Clone)]
pub struct EngineCatalog {
    rungs: Vec<EngineRung>,
}

impl EngineCatalog {
    /// Build a catalog from records, sorting ascending by rating and
    /// assigning rung indices.
    pub fn from_records(mut records: Vec<CatalogRecord>) -> Self {
        records.sort_by_key(|r| r.rating);
        let rungs = records
            .into_iter()
            .enumerate()
            .map(|(index, r)| EngineRung {
                name: r.name,
                rating: r.rating,
                path: r.path,
                index,
            })
            .collect();
        Self { rungs }
    }

    /// Load a catalog from a JSON file. The file need not be sorted.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let records = read_records(path)?;
        if records.is_empty() {
            return Err(CatalogError::Empty {
                path: path.display().to_string(),
            });
        }
        Ok(Self::from_records(records))
    }

    pub fn rung(&self, index: usize) -> Result<&EngineRung, CatalogError> {
        self.rungs.get(index).ok_or(CatalogError::OutOfRange {
            index,
            len: self.rungs.len(),
        })
    }

    pub fn by_name(&self, name: &str) -> Result<&EngineRung, CatalogError> {
        self.rungs
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CatalogError::UnknownEngine(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    /// Highest rung index. Catalogs are never empty once loaded.
    pub fn max_index(&self) -> usize {
        self.rungs.len().saturating_sub(1)
    }

    /// Score for beating every engine twice: the full-ladder stop condition.
    pub fn full_clear_score(&self) -> f64 {
        self.rungs.len() as f64 * 20.0
    }

    pub fn rungs(&self) -> &[EngineRung] {
        &self.rungs
    }
}

/// Normalize a hand-edited catalog file on disk: sort ascending by rating
/// and rewrite it.
pub fn sort_and_rewrite(path: &Path) -> Result<EngineCatalog, CatalogError> {
    let catalog = EngineCatalog::load(path)?;
    let records: Vec<CatalogRecord> = catalog
        .rungs()
        .iter()
        .map(|r| CatalogRecord {
            name: r.name.clone(),
            rating: r.rating,
            path: r.path.clone(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&records).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(catalog)
}

fn read_records(path: &Path) -> Result<Vec<CatalogRecord>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CatalogRecord> {
        vec![
            CatalogRecord {
                name: "mid".into(),
                rating: 1200,
                path: "engines/mid".into(),
            },
            CatalogRecord {
                name: "weak".into(),
                rating: 800,
                path: "engines/weak".into(),
            },
            CatalogRecord {
                name: "strong".into(),
                rating: 1600,
                path: "engines/strong".into(),
            },
        ]
    }

    #[test]
    fn sorts_ascending_and_indexes() {
        let catalog = EngineCatalog::from_records(records());
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.rung(0).unwrap().name, "weak");
        assert_eq!(catalog.rung(1).unwrap().name, "mid");
        assert_eq!(catalog.rung(2).unwrap().name, "strong");
        assert_eq!(catalog.rung(2).unwrap().index, 2);
        assert_eq!(catalog.max_index(), 2);
        assert_eq!(catalog.full_clear_score(), 60.0);
    }

    #[test]
    fn lookup_by_name() {
        let catalog = EngineCatalog::from_records(records());
        assert_eq!(catalog.by_name("mid").unwrap().rating, 1200);
        assert!(matches!(
            catalog.by_name("missing"),
            Err(CatalogError::UnknownEngine(_))
        ));
    }

    #[test]
    fn out_of_range_index() {
        let catalog = EngineCatalog::from_records(records());
        assert!(matches!(
            catalog.rung(3),
            Err(CatalogError::OutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn sort_and_rewrite_normalizes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, serde_json::to_string(&records()).unwrap()).unwrap();

        sort_and_rewrite(&path).unwrap();

        let rewritten: Vec<CatalogRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let ratings: Vec<i32> = rewritten.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![800, 1200, 1600]);
    }

    #[test]
    fn empty_catalog_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            EngineCatalog::load(&path),
            Err(CatalogError::Empty { .. })
        ));
    }
}
