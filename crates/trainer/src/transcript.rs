//! PGN transcripts of ladder games.
//!
//! Layout: `<results>/generation<N>/<candidate>/<engine>_<white|black>.pgn`,
//! one file per rung per color played. The color in the file name is the
//! candidate's color.

use std::io;
use std::path::{Path, PathBuf};

use evo_core::{Color, GameStatus};

/// Writes one PGN file per completed game.
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    root: PathBuf,
}

impl TranscriptWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write a finished game, returning the path written.
    pub fn write_game(
        &self,
        generation: u64,
        candidate: &str,
        engine: &str,
        candidate_color: Color,
        moves: &[String],
        status: GameStatus,
    ) -> io::Result<PathBuf> {
        let dir = self
            .root
            .join(format!("generation{}", generation))
            .join(candidate);
        std::fs::create_dir_all(&dir)?;

        let (white, black) = match candidate_color {
            Color::White => (candidate, engine),
            Color::Black => (engine, candidate),
        };
        let path = dir.join(format!("{}_{}.pgn", engine, candidate_color.as_str()));
        std::fs::write(&path, render_pgn(white, black, moves, status))?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn render_pgn(white: &str, black: &str, moves: &[String], status: GameStatus) -> String {
    let result = status.pgn_result();
    let mut pgn = String::new();
    pgn.push_str("[Event \"Training ladder\"]\n");
    pgn.push_str(&format!("[White \"{}\"]\n", white));
    pgn.push_str(&format!("[Black \"{}\"]\n", black));
    pgn.push_str(&format!("[Result \"{}\"]\n", result));
    pgn.push('\n');

    for (i, pair) in moves.chunks(2).enumerate() {
        pgn.push_str(&format!("{}. {}", i + 1, pair[0]));
        if let Some(reply) = pair.get(1) {
            pgn.push_str(&format!(" {}", reply));
        }
        pgn.push(' ');
    }
    pgn.push_str(result);
    pgn.push('\n');
    pgn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path());

        let moves = vec!["take1".to_string(), "take3".to_string(), "take2".to_string()];
        let path = writer
            .write_game(2, "model1", "stockfish-800", Color::Black, &moves, GameStatus::WhiteWins)
            .unwrap();

        assert_eq!(
            path,
            dir.path()
                .join("generation2")
                .join("model1")
                .join("stockfish-800_black.pgn")
        );

        let pgn = std::fs::read_to_string(&path).unwrap();
        assert!(pgn.contains("[White \"stockfish-800\"]"));
        assert!(pgn.contains("[Black \"model1\"]"));
        assert!(pgn.contains("[Result \"1-0\"]"));
        assert!(pgn.contains("1. take1 take3 2. take2 1-0"));
    }
}
