//! Board, side and move types for 3x3 tic-tac-toe.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

pub const BOARD_SIZE: usize = 3;

/// One of the two symmetric sides. `X` always moves first in a fresh game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    X,
    O,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Side::X => 'X',
            Side::O => 'O',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A (row, col) coordinate, each in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Build a move, rejecting coordinates outside the grid.
    pub fn checked(row: usize, col: usize) -> Result<Self, EngineError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(EngineError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Result of committing a move to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Win(Side),
    Draw,
    Continue,
}

/// 3x3 grid. `None` = empty, `Some(side)` = occupied by that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Side>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [[Option<Side>; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Parse a 9-character row-major layout: `X`, `O`, and `.`/`-`/`_` for empty.
    /// Whitespace and the row separators `/` and `|` are ignored.
    pub fn parse(layout: &str) -> Result<Self, EngineError> {
        let symbols: Vec<char> = layout
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '/' | '|'))
            .collect();
        if symbols.len() != BOARD_SIZE * BOARD_SIZE {
            return Err(EngineError::InvalidLayout(layout.to_string()));
        }
        let mut board = Board::new();
        for (i, c) in symbols.into_iter().enumerate() {
            let cell = match c {
                'X' | 'x' => Some(Side::X),
                'O' | 'o' => Some(Side::O),
                '.' | '-' | '_' => None,
                _ => return Err(EngineError::InvalidLayout(layout.to_string())),
            };
            board.cells[i / BOARD_SIZE][i % BOARD_SIZE] = cell;
        }
        Ok(board)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Side> {
        self.cells[row][col]
    }

    pub fn at(&self, mv: Move) -> Option<Side> {
        self.cells[mv.row][mv.col]
    }

    pub fn is_empty_at(&self, mv: Move) -> bool {
        mv.in_bounds() && self.cells[mv.row][mv.col].is_none()
    }

    pub fn cells(&self) -> &[[Option<Side>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub(crate) fn set(&mut self, mv: Move, cell: Option<Side>) {
        self.cells[mv.row][mv.col] = cell;
    }

    /// Row-major iteration over `(move, cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (Move, Option<Side>)> + '_ {
        (0..BOARD_SIZE).flat_map(move |row| {
            (0..BOARD_SIZE).map(move |col| (Move::new(row, col), self.cells[row][col]))
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let line: Vec<String> = cells
                .iter()
                .map(|c| format!(" {} ", c.map(Side::symbol).unwrap_or(' ')))
                .collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
