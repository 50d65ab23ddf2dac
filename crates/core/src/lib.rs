//! Chess Review Core Library
//!
//! Step through a recorded game, stream engine evaluations of the position
//! on the board and label each move by how much it changed the evaluation.

pub mod chesscom;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod navigator;
pub mod parser;
pub mod quality;
pub mod replay;
pub mod session;

pub use chesscom::ChessComClient;
pub use config::ReviewConfig;
pub use engine::{EngineClient, EngineError, EngineEvent, EngineEventKind, EvaluationResult};
pub use error::{Error, Result};
pub use game::GameRecord;
pub use navigator::{Navigator, UserMove, UserMovePolicy};
pub use parser::MoveList;
pub use quality::{classify, MoveQuality, MoveQualityMap, MoveScorer, ScorerKind};
pub use replay::{BoardPosition, LastMove};
pub use session::ReviewSession;
