//! Tic-tac-toe board model and rules.
//!
//! The board is a plain `Copy` value; everything that inspects it lives in
//! [`rules`] as free functions so the search can run on a private copy without
//! any shared state.

pub mod rules;
pub mod types;

pub use types::{Board, CheckResult, Move, Side, BOARD_SIZE};
