//! Error type shared by the engine, session and persistence layers.

use std::path::PathBuf;

use thiserror::Error;

use crate::games::tictactoe::Side;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("cell ({row}, {col}) is outside the 3x3 board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied by {owner}")]
    CellOccupied { row: usize, col: usize, owner: Side },

    #[error("it is not {side}'s turn")]
    NotYourTurn { side: Side },

    #[error("game already over")]
    GameOver,

    #[error("invalid board layout '{0}'")]
    InvalidLayout(String),

    #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
    UnknownDifficulty(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
