//! Stateless rule predicates over a [`Board`].

use crate::engine::error::EngineError;
use crate::games::tictactoe::types::{Board, CheckResult, Move, Side, BOARD_SIZE};

pub fn line_match(board: &Board, row: usize) -> bool {
    let first = board.get(row, 0);
    first.is_some() && first == board.get(row, 1) && first == board.get(row, 2)
}

pub fn column_match(board: &Board, col: usize) -> bool {
    let first = board.get(0, col);
    first.is_some() && first == board.get(1, col) && first == board.get(2, col)
}

/// Top-left to bottom-right.
pub fn main_diagonal_match(board: &Board) -> bool {
    let first = board.get(0, 0);
    first.is_some() && first == board.get(1, 1) && first == board.get(2, 2)
}

/// Top-right to bottom-left.
pub fn anti_diagonal_match(board: &Board) -> bool {
    let first = board.get(0, 2);
    first.is_some() && first == board.get(1, 1) && first == board.get(2, 0)
}

/// Owner of the first completed line: rows, then columns, then diagonals.
pub fn winner(board: &Board) -> Option<Side> {
    for row in 0..BOARD_SIZE {
        if line_match(board, row) {
            return board.get(row, 0);
        }
    }
    for col in 0..BOARD_SIZE {
        if column_match(board, col) {
            return board.get(0, col);
        }
    }
    if main_diagonal_match(board) {
        return board.get(0, 0);
    }
    if anti_diagonal_match(board) {
        return board.get(0, 2);
    }
    None
}

/// True iff no cell is empty. Check [`winner`] first: a full board with a line is a win.
pub fn is_terminal_draw(board: &Board) -> bool {
    board.iter().all(|(_, cell)| cell.is_some())
}

pub fn is_first_move(board: &Board) -> bool {
    moves_played(board) == 0
}

pub fn moves_played(board: &Board) -> usize {
    board.iter().filter(|(_, cell)| cell.is_some()).count()
}

/// Empty cells in row-major order. Downstream tie-breaking depends on this order.
pub fn empty_cells(board: &Board) -> Vec<Move> {
    board
        .iter()
        .filter(|(_, cell)| cell.is_none())
        .map(|(mv, _)| mv)
        .collect()
}

/// Side expected to move next, assuming `X` opened.
pub fn side_to_move(board: &Board) -> Side {
    if moves_played(board) % 2 == 0 {
        Side::X
    } else {
        Side::O
    }
}

/// Place `side` at `mv` and report the resulting state.
///
/// An out-of-range or occupied target is rejected and the board is left untouched.
pub fn commit_move(board: &mut Board, mv: Move, side: Side) -> Result<CheckResult, EngineError> {
    if !mv.in_bounds() {
        return Err(EngineError::OutOfBounds { row: mv.row, col: mv.col });
    }
    if let Some(owner) = board.at(mv) {
        return Err(EngineError::CellOccupied { row: mv.row, col: mv.col, owner });
    }
    board.set(mv, Some(side));

    if let Some(w) = winner(board) {
        return Ok(CheckResult::Win(w));
    }
    if is_terminal_draw(board) {
        return Ok(CheckResult::Draw);
    }
    Ok(CheckResult::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column_matches() {
        let board = Board::parse("XXX/OO./...").unwrap();
        assert!(line_match(&board, 0));
        assert!(!line_match(&board, 1));
        assert!(!line_match(&board, 2)); // empty row is not a match

        let board = Board::parse("O.X/O.X/O..").unwrap();
        assert!(column_match(&board, 0));
        assert!(!column_match(&board, 2));
        assert_eq!(winner(&board), Some(Side::O));
    }

    #[test]
    fn test_diagonals() {
        let board = Board::parse("X.O/.XO/..X").unwrap();
        assert!(main_diagonal_match(&board));
        assert!(!anti_diagonal_match(&board));

        let board = Board::parse("X.O/XO./O..").unwrap();
        assert!(anti_diagonal_match(&board));
        assert_eq!(winner(&board), Some(Side::O));
    }

    #[test]
    fn test_draw_detection() {
        let board = Board::parse("XOX/XOO/OXX").unwrap();
        assert_eq!(winner(&board), None);
        assert!(is_terminal_draw(&board));
        assert!(!is_terminal_draw(&Board::parse("XOX/XO./OXX").unwrap()));
    }

    #[test]
    fn test_census_helpers() {
        let empty = Board::new();
        assert!(is_first_move(&empty));
        assert_eq!(empty_cells(&empty).len(), 9);

        let board = Board::parse("X../.O./...").unwrap();
        assert!(!is_first_move(&board));
        assert_eq!(moves_played(&board), 2);
        assert_eq!(side_to_move(&board), Side::X);
        let cells = empty_cells(&board);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], Move::new(0, 1));
        assert_eq!(cells[2], Move::new(1, 0));
    }

    #[test]
    fn test_commit_move_flow() {
        let mut board = Board::parse("XX./OO./...").unwrap();
        assert_eq!(commit_move(&mut board, Move::new(2, 0), Side::X).unwrap(), CheckResult::Continue);
        assert_eq!(commit_move(&mut board, Move::new(0, 2), Side::X).unwrap(), CheckResult::Win(Side::X));
    }

    #[test]
    fn test_commit_move_draw() {
        let mut board = Board::parse("XOX/XOO/OX.").unwrap();
        assert_eq!(commit_move(&mut board, Move::new(2, 2), Side::X).unwrap(), CheckResult::Draw);
    }

    #[test]
    fn test_illegal_move_does_not_mutate() {
        let mut board = Board::parse("X../.../...").unwrap();
        let before = board;
        let err = commit_move(&mut board, Move::new(0, 0), Side::O).unwrap_err();
        assert!(matches!(err, EngineError::CellOccupied { owner: Side::X, .. }));
        assert_eq!(board, before);

        assert!(commit_move(&mut board, Move::new(5, 1), Side::O).is_err());
        assert_eq!(board, before);
    }
}
