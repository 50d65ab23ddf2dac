//! Error types for chess-review-core

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chess.com API error: {0}")]
    ChessCom(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("PGN parsing error: {0}")]
    Pgn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
