//! A subtraction game (Nim with a single pile) implementing the `Board`
//! capability. Tiny branching factor and bounded length make it a good
//! stand-in for chess when exercising the tournament infrastructure.

use evo_core::{Board, Color, GameStatus, IllegalMove, Rules};

/// Tokens in the pile at the start of a game.
pub const START_TOKENS: u32 = 21;

/// Single-pile Nim: players alternately take 1-3 tokens, taking the last
/// token wins. White moves first.
#[derive(Debug, Clone)]
pub struct NimBoard {
    tokens: u32,
    side_to_move: Color,
}

impl NimBoard {
    pub fn new(tokens: u32) -> Self {
        Self {
            tokens,
            side_to_move: Color::White,
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    fn parse_take(mv: &str) -> Option<u32> {
        match mv {
            "take1" => Some(1),
            "take2" => Some(2),
            "take3" => Some(3),
            _ => None,
        }
    }
}

impl Default for NimBoard {
    fn default() -> Self {
        Self::new(START_TOKENS)
    }
}

impl Board for NimBoard {
    fn legal_moves(&self) -> Vec<String> {
        (1..=3)
            .filter(|take| *take <= self.tokens)
            .map(|take| format!("take{}", take))
            .collect()
    }

    fn apply(&mut self, mv: &str) -> Result<(), IllegalMove> {
        let take = Self::parse_take(mv).ok_or_else(|| IllegalMove(mv.to_string()))?;
        if take > self.tokens || self.status() != GameStatus::Ongoing {
            return Err(IllegalMove(mv.to_string()));
        }
        self.tokens -= take;
        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }

    fn status(&self) -> GameStatus {
        if self.tokens == 0 {
            // The side that took the last token has already moved.
            match self.side_to_move {
                Color::White => GameStatus::BlackWins,
                Color::Black => GameStatus::WhiteWins,
            }
        } else {
            GameStatus::Ongoing
        }
    }

    fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    fn features(&self) -> Vec<f64> {
        vec![
            self.tokens as f64 / START_TOKENS as f64,
            // A pile size divisible by 4 is a lost position for the mover.
            if self.tokens % 4 == 0 { 1.0 } else { 0.0 },
            match self.side_to_move {
                Color::White => 1.0,
                Color::Black => -1.0,
            },
        ]
    }

    fn clone_box(&self) -> Box<dyn Board> {
        Box::new(self.clone())
    }
}

/// Rule set producing fresh Nim games.
#[derive(Debug, Clone, Default)]
pub struct NimRules;

impl Rules for NimRules {
    fn new_game(&self) -> Box<dyn Board> {
        Box::new(NimBoard::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_moves_shrink_with_pile() {
        let board = NimBoard::new(2);
        assert_eq!(board.legal_moves(), vec!["take1", "take2"]);
    }

    #[test]
    fn taking_last_token_wins() {
        let mut board = NimBoard::new(3);
        board.apply("take3").unwrap();
        assert_eq!(board.status(), GameStatus::WhiteWins);
    }

    #[test]
    fn sides_alternate() {
        let mut board = NimBoard::default();
        assert_eq!(board.side_to_move(), Color::White);
        board.apply("take1").unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
    }

    #[test]
    fn illegal_moves_rejected() {
        let mut board = NimBoard::new(1);
        assert!(board.apply("take2").is_err());
        assert!(board.apply("castle").is_err());
    }
}
