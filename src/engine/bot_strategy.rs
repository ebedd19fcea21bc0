//! Bot strategy trait and implementations.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::engine::minimax::MinimaxEngine;
use crate::games::tictactoe::rules::{empty_cells, is_first_move, moves_played};
use crate::games::tictactoe::{Board, Move, Side};

/// Lowest temperature used for softmax; keeps the exponent finite.
pub const MIN_TEMPERATURE: f64 = 0.001;

/// A bot strategy picks a move for `side`. Returns `None` only when the board is full.
pub trait BotStrategy: Send + Sync {
    fn choose_move(&self, board: &Board, side: Side, rng: &mut dyn RngCore) -> Option<Move>;
}

/// Picks a uniformly random empty cell.
pub struct RandomStrategy;

impl BotStrategy for RandomStrategy {
    fn choose_move(&self, board: &Board, _side: Side, rng: &mut dyn RngCore) -> Option<Move> {
        empty_cells(board).choose(rng).copied()
    }
}

/// Deterministic optimal play with a two-ply opening book.
///
/// Ply 1 takes the top-left corner, ply 2 takes the center when it is free;
/// everything else comes from the full minimax search.
#[derive(Default)]
pub struct OptimalStrategy {
    engine: MinimaxEngine,
}

pub const OPENING_CORNER: Move = Move::new(0, 0);
pub const CENTER: Move = Move::new(1, 1);

impl BotStrategy for OptimalStrategy {
    fn choose_move(&self, board: &Board, side: Side, _rng: &mut dyn RngCore) -> Option<Move> {
        if is_first_move(board) {
            return Some(OPENING_CORNER);
        }
        if moves_played(board) == 1 && board.is_empty_at(CENTER) {
            return Some(CENTER);
        }
        self.engine.find_best_move(board, side)
    }
}

/// Knobs for [`SamplingStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub avoid_best_probability: f64,
    pub random_move_probability: f64,
}

impl SamplingParams {
    pub const EASY: SamplingParams = SamplingParams {
        temperature: 2.5,
        avoid_best_probability: 0.7,
        random_move_probability: 0.3,
    };

    pub const MEDIUM: SamplingParams = SamplingParams {
        temperature: 1.2,
        avoid_best_probability: 0.4,
        random_move_probability: 0.1,
    };
}

/// Fallible play: random gate, softmax over minimax values, optional
/// avoidance of the best move, then one cumulative draw.
pub struct SamplingStrategy {
    pub params: SamplingParams,
    engine: MinimaxEngine,
}

impl SamplingStrategy {
    pub fn new(params: SamplingParams) -> Self {
        Self { params, engine: MinimaxEngine::new() }
    }
}

impl BotStrategy for SamplingStrategy {
    fn choose_move(&self, board: &Board, side: Side, rng: &mut dyn RngCore) -> Option<Move> {
        let empty = empty_cells(board);
        if empty.is_empty() {
            return None;
        }

        if rng.gen::<f64>() < self.params.random_move_probability.clamp(0.0, 1.0) {
            tracing::trace!(%side, "random gate taken");
            return empty.choose(rng).copied();
        }

        let values: Vec<f64> = empty
            .iter()
            .map(|mv| self.engine.evaluate_move(board, mv.row, mv.col, side))
            .collect();
        let best_idx = argmax(&values)?;

        let avoid_best = rng.gen::<f64>() < self.params.avoid_best_probability.clamp(0.0, 1.0);
        let probs = match sampling_distribution(&values, self.params.temperature, avoid_best) {
            Some(p) => p,
            None if avoid_best => {
                tracing::debug!(%side, "no mass left after avoiding best move, picking uniformly");
                return empty.choose(rng).copied();
            }
            None => return Some(empty[best_idx]),
        };

        let draw = rng.gen::<f64>();
        let idx = sample_index(&probs, draw).unwrap_or(best_idx);
        tracing::debug!(%side, chosen = %empty[idx], avoid_best, draw, "sampled move");
        Some(empty[idx])
    }
}

/// Index of the first strictly greatest finite value.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Unnormalized softmax weights `exp((v - max) / T)`. Subtracting the max keeps
/// the exponent non-positive; it does not change the normalized distribution.
pub fn softmax_weights(values: &[f64], temperature: f64) -> Vec<f64> {
    let t = temperature.max(MIN_TEMPERATURE);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values.iter().map(|v| ((v - max) / t).exp()).collect()
}

/// Normalized softmax. `None` if the weights cannot be normalized.
pub fn softmax(values: &[f64], temperature: f64) -> Option<Vec<f64>> {
    normalize(softmax_weights(values, temperature))
}

/// Softmax distribution, optionally with the first argmax zeroed out and the
/// remainder renormalized. `None` when no probability mass remains.
pub fn sampling_distribution(values: &[f64], temperature: f64, avoid_best: bool) -> Option<Vec<f64>> {
    let mut weights = softmax_weights(values, temperature);
    if avoid_best {
        let best = argmax(values)?;
        weights[best] = 0.0;
    }
    normalize(weights)
}

fn normalize(mut weights: Vec<f64>) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Some(weights)
}

/// Cumulative scan: first index whose running total reaches `draw`.
/// Rounding can leave the total just under 1.0, so fall back to the last
/// index carrying any mass.
pub fn sample_index(probs: &[f64], draw: f64) -> Option<usize> {
    let mut acc = 0.0;
    for (i, p) in probs.iter().enumerate() {
        acc += p;
        if *p > 0.0 && draw <= acc {
            return Some(i);
        }
    }
    probs.iter().rposition(|p| *p > 0.0)
}
