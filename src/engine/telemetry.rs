//! Per-side move telemetry collected during a game.

use serde::{Deserialize, Serialize};

use crate::engine::minimax::MinimaxEngine;
use crate::games::tictactoe::{Board, Move, Side};

/// Values this close to zero count as a drawn line of play.
pub const DRAW_EPSILON: f64 = 0.01;

/// One entry per committed move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveTelemetry {
    pub chosen_value: f64,
    pub best_value: f64,
    pub max_depth: u32,
    pub node_count: u64,
    pub optimality_ratio: f64,
}

/// Chosen value relative to the best available value.
///
/// `1.0` when both are (near) zero, `0.0` when only the best is near zero,
/// otherwise `chosen / best`. The quotient is not clamped: a losing position
/// can yield ratios above 1 and a blunder from a winning one goes negative.
pub fn optimality_ratio(chosen: f64, best: f64) -> f64 {
    if best.abs() > DRAW_EPSILON {
        chosen / best
    } else if chosen.abs() < DRAW_EPSILON {
        1.0
    } else {
        0.0
    }
}

/// Evaluate `mv` for `side` against the best alternative, on the board as it
/// stands *before* the move is applied. `None` if `mv` is not playable.
pub fn evaluate_committed_move(
    engine: &MinimaxEngine,
    board: &Board,
    mv: Move,
    side: Side,
) -> Option<MoveTelemetry> {
    if !board.is_empty_at(mv) {
        return None;
    }
    let chosen = engine.evaluate_move_with_metrics(board, mv.row, mv.col, side);
    let (best_move, best) = engine.find_best_move_with_metrics(board, side)?;
    let ratio = optimality_ratio(chosen.value, best.value);

    tracing::debug!(
        %side,
        played = %mv,
        best = %best_move,
        chosen_value = chosen.value,
        best_value = best.value,
        depth = chosen.max_depth,
        nodes = chosen.node_count,
        ratio,
        "move evaluated"
    );

    Some(MoveTelemetry {
        chosen_value: chosen.value,
        best_value: best.value,
        max_depth: chosen.max_depth,
        node_count: chosen.node_count,
        optimality_ratio: ratio,
    })
}

/// Append-only log for one side. Reset between games, never recreated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRecord {
    entries: Vec<MoveTelemetry>,
}

impl EvaluationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, entry: MoveTelemetry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MoveTelemetry] {
        &self.entries
    }

    pub fn move_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn average_value(&self) -> f64 {
        self.mean(|e| e.chosen_value)
    }

    pub fn average_best_value(&self) -> f64 {
        self.mean(|e| e.best_value)
    }

    pub fn average_depth(&self) -> f64 {
        self.mean(|e| e.max_depth as f64)
    }

    pub fn average_node_count(&self) -> f64 {
        self.mean(|e| e.node_count as f64)
    }

    pub fn average_optimality_ratio(&self) -> f64 {
        self.mean(|e| e.optimality_ratio)
    }

    fn mean(&self, f: impl Fn(&MoveTelemetry) -> f64) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(f).sum::<f64>() / self.entries.len() as f64
    }
}
