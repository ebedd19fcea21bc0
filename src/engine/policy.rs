//! Difficulty tiers and the move-probability preview shown as hints.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::engine::bot_strategy::{
    argmax, softmax, BotStrategy, OptimalStrategy, SamplingParams, SamplingStrategy,
};
use crate::engine::error::EngineError;
use crate::engine::minimax::MinimaxEngine;
use crate::games::tictactoe::rules::empty_cells;
use crate::games::tictactoe::{Board, Move, Side};

/// Temperature used for hint previews.
pub const HINT_TEMPERATURE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(EngineError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Move selection for the artificial opponent, switched by difficulty tier.
pub struct DecisionPolicy {
    difficulty: Difficulty,
    easy: SamplingStrategy,
    medium: SamplingStrategy,
    hard: OptimalStrategy,
}

impl DecisionPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_params(difficulty, SamplingParams::EASY, SamplingParams::MEDIUM)
    }

    pub fn with_params(difficulty: Difficulty, easy: SamplingParams, medium: SamplingParams) -> Self {
        Self {
            difficulty,
            easy: SamplingStrategy::new(easy),
            medium: SamplingStrategy::new(medium),
            hard: OptimalStrategy::default(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.difficulty != difficulty {
            tracing::info!(from = %self.difficulty, to = %difficulty, "difficulty changed");
        }
        self.difficulty = difficulty;
    }

    pub fn params(&self, difficulty: Difficulty) -> Option<SamplingParams> {
        match difficulty {
            Difficulty::Easy => Some(self.easy.params),
            Difficulty::Medium => Some(self.medium.params),
            Difficulty::Hard => None,
        }
    }

    /// Legal move for `side` at the current tier, or `None` on a full board.
    pub fn select_move(&self, board: &Board, side: Side, rng: &mut dyn RngCore) -> Option<Move> {
        let strategy: &dyn BotStrategy = match self.difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        };
        strategy.choose_move(board, side, rng)
    }
}

impl BotStrategy for DecisionPolicy {
    fn choose_move(&self, board: &Board, side: Side, rng: &mut dyn RngCore) -> Option<Move> {
        self.select_move(board, side, rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveProbability {
    pub row: usize,
    pub col: usize,
    pub probability: f64,
}

/// Softmax preview over every empty cell, in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveProbabilities {
    pub candidates: Vec<MoveProbability>,
    pub best_move: Option<Move>,
}

impl MoveProbabilities {
    pub fn probability_at(&self, mv: Move) -> Option<f64> {
        self.candidates
            .iter()
            .find(|c| c.row == mv.row && c.col == mv.col)
            .map(|c| c.probability)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Evaluate every empty cell for `side` and turn the values into a softmax
/// distribution at `temperature`. Display only; never used to commit a move.
pub fn move_probabilities(board: &Board, side: Side, temperature: f64) -> MoveProbabilities {
    let engine = MinimaxEngine::new();
    let empty = empty_cells(board);
    if empty.is_empty() {
        return MoveProbabilities::default();
    }

    let values: Vec<f64> = empty
        .iter()
        .map(|mv| engine.evaluate_move(board, mv.row, mv.col, side))
        .collect();
    let best_idx = argmax(&values);
    let best_move = best_idx.map(|i| empty[i]);

    // Degenerate weights: put all mass on the best cell.
    let probs = softmax(&values, temperature).unwrap_or_else(|| {
        (0..values.len()).map(|i| if Some(i) == best_idx { 1.0 } else { 0.0 }).collect()
    });

    let candidates = empty
        .iter()
        .zip(probs)
        .map(|(mv, probability)| MoveProbability { row: mv.row, col: mv.col, probability })
        .collect();

    MoveProbabilities { candidates, best_move }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "easy");
    }

    #[test]
    fn test_hard_opens_in_corner() {
        let policy = DecisionPolicy::new(Difficulty::Hard);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.select_move(&Board::new(), Side::X, &mut rng), Some(Move::new(0, 0)));
    }

    #[test]
    fn test_every_tier_returns_legal_moves() {
        let board = Board::parse("X.O/.X./...").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut policy = DecisionPolicy::new(Difficulty::Easy);
        for difficulty in Difficulty::ALL {
            policy.set_difficulty(difficulty);
            for _ in 0..25 {
                let mv = policy.select_move(&board, Side::O, &mut rng).unwrap();
                assert!(board.is_empty_at(mv), "{difficulty} picked occupied {mv}");
            }
        }
    }

    #[test]
    fn test_full_board_yields_none() {
        let board = Board::parse("XOX/XOO/OXX").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for difficulty in Difficulty::ALL {
            let policy = DecisionPolicy::new(difficulty);
            assert_eq!(policy.select_move(&board, Side::X, &mut rng), None);
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let board = Board::parse("X../.O./...").unwrap();
        let probs = move_probabilities(&board, Side::X, HINT_TEMPERATURE);
        assert_eq!(probs.candidates.len(), 7);
        let total: f64 = probs.candidates.iter().map(|c| c.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(probs.best_move.is_some());
    }

    #[test]
    fn test_probabilities_empty_on_full_board() {
        let board = Board::parse("XOX/XOO/OXX").unwrap();
        let probs = move_probabilities(&board, Side::O, HINT_TEMPERATURE);
        assert!(probs.is_empty());
        assert_eq!(probs.best_move, None);
    }

    #[test]
    fn test_probabilities_highlight_winning_cell() {
        let board = Board::parse("XX./OO./...").unwrap();
        let probs = move_probabilities(&board, Side::X, HINT_TEMPERATURE);
        assert_eq!(probs.best_move, Some(Move::new(0, 2)));
        let win = probs.probability_at(Move::new(0, 2)).unwrap();
        for c in &probs.candidates {
            assert!(c.probability <= win);
        }
        // Row-major order is preserved.
        assert_eq!((probs.candidates[0].row, probs.candidates[0].col), (0, 2));
        assert_eq!((probs.candidates[1].row, probs.candidates[1].col), (1, 2));
    }
}
