//! Exhaustive minimax search over the 3x3 board.
//!
//! No pruning: the full tree from the empty board is ~550k nodes, so every
//! query is answered exactly. Terminal values are `+10 - depth` for a
//! maximizer line and `-10 + depth` for a minimizer line, which makes the
//! search prefer quick wins and slow losses among equal outcomes.

use serde::{Deserialize, Serialize};

use crate::games::tictactoe::rules::{empty_cells, is_terminal_draw, winner};
use crate::games::tictactoe::{Board, Move, Side};

/// Value returned when a move cannot be evaluated (target cell occupied or off the board).
pub const UNEVALUABLE: f64 = f64::NEG_INFINITY;

pub const WIN_SCORE: f64 = 10.0;

/// Value of one evaluated move plus the size of the search that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvaluation {
    pub value: f64,
    pub max_depth: u32,
    pub node_count: u64,
}

impl MoveEvaluation {
    fn unevaluable() -> Self {
        Self { value: UNEVALUABLE, max_depth: 0, node_count: 0 }
    }
}

/// Running counters threaded through one search.
#[derive(Debug, Default, Clone, Copy)]
struct SearchStats {
    max_depth: u32,
    node_count: u64,
}

/// Stateless search engine. Every query copies the caller's board, so the
/// caller's board is never observed mid-simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxEngine;

impl MinimaxEngine {
    pub fn new() -> Self {
        Self
    }

    /// Best move for `maximizer`: first row-major cell with the strictly greatest value.
    pub fn find_best_move(&self, board: &Board, maximizer: Side) -> Option<Move> {
        self.find_best_move_with_metrics(board, maximizer).map(|(mv, _)| mv)
    }

    /// Same search as [`find_best_move`](Self::find_best_move), also reporting the
    /// deepest ply reached and the nodes visited across all root children.
    pub fn find_best_move_with_metrics(
        &self,
        board: &Board,
        maximizer: Side,
    ) -> Option<(Move, MoveEvaluation)> {
        let mut scratch = *board;
        let mut stats = SearchStats::default();
        let mut best: Option<(Move, f64)> = None;

        for mv in empty_cells(&scratch) {
            let value = with_move(&mut scratch, mv, maximizer, |b| {
                minimax(b, 0, false, maximizer, &mut stats)
            });
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((mv, value));
            }
        }

        let (mv, value) = best?;
        tracing::debug!(
            %maximizer,
            best = %mv,
            value,
            nodes = stats.node_count,
            depth = stats.max_depth,
            "best move search complete"
        );
        Some((
            mv,
            MoveEvaluation {
                value,
                max_depth: stats.max_depth,
                node_count: stats.node_count,
            },
        ))
    }

    /// Value of playing `side` at `(row, col)`, assuming optimal play afterwards.
    /// Returns [`UNEVALUABLE`] if the cell is occupied or out of range.
    pub fn evaluate_move(&self, board: &Board, row: usize, col: usize, side: Side) -> f64 {
        self.evaluate_move_with_metrics(board, row, col, side).value
    }

    pub fn evaluate_move_with_metrics(
        &self,
        board: &Board,
        row: usize,
        col: usize,
        side: Side,
    ) -> MoveEvaluation {
        let mv = Move::new(row, col);
        if !board.is_empty_at(mv) {
            tracing::debug!(%side, cell = %mv, "refusing to evaluate an unavailable cell");
            return MoveEvaluation::unevaluable();
        }

        let mut scratch = *board;
        let mut stats = SearchStats::default();
        let value = with_move(&mut scratch, mv, side, |b| minimax(b, 0, false, side, &mut stats));
        MoveEvaluation {
            value,
            max_depth: stats.max_depth,
            node_count: stats.node_count,
        }
    }

    /// Game-theoretic value of `board` for `maximizer` with `to_move` playing next.
    pub fn position_value(&self, board: &Board, maximizer: Side, to_move: Side) -> f64 {
        let mut scratch = *board;
        let mut stats = SearchStats::default();
        minimax(&mut scratch, 0, to_move == maximizer, maximizer, &mut stats)
    }
}

/// Place `side` at `mv`, run `f`, and restore the cell before returning.
fn with_move<T>(board: &mut Board, mv: Move, side: Side, f: impl FnOnce(&mut Board) -> T) -> T {
    board.set(mv, Some(side));
    let out = f(board);
    board.set(mv, None);
    out
}

fn terminal_value(board: &Board, depth: u32, maximizer: Side) -> Option<f64> {
    match winner(board) {
        Some(side) if side == maximizer => Some(WIN_SCORE - depth as f64),
        Some(_) => Some(-WIN_SCORE + depth as f64),
        None if is_terminal_draw(board) => Some(0.0),
        None => None,
    }
}

fn minimax(board: &mut Board, depth: u32, is_max: bool, maximizer: Side, stats: &mut SearchStats) -> f64 {
    stats.node_count += 1;
    stats.max_depth = stats.max_depth.max(depth);

    if let Some(value) = terminal_value(board, depth, maximizer) {
        return value;
    }

    let mover = if is_max { maximizer } else { maximizer.opponent() };
    let mut best = if is_max { f64::NEG_INFINITY } else { f64::INFINITY };

    for mv in empty_cells(board) {
        let value = with_move(board, mv, mover, |b| minimax(b, depth + 1, !is_max, maximizer, stats));
        best = if is_max { best.max(value) } else { best.min(value) };
    }
    best
}
