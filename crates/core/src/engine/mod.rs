//! Chess engine integration
//!
//! Streams evaluations from a UCI-compatible engine like Stockfish.

pub mod analysis;
pub mod client;
pub mod launcher;

use thiserror::Error;

// Re-export main types for convenience
pub use analysis::{EngineOutput, EvaluationResult};
pub use client::{EngineClient, EngineEvent, EngineEventKind, DEFAULT_DEPTH, MAX_DEPTH};
pub use launcher::{EngineIo, EngineLauncher, ProcessLauncher};

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    #[error("Failed to start engine: {0}")]
    Spawn(String),

    /// Failed to communicate with engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tasks cannot be spawned without a Tokio runtime
    #[error("No Tokio runtime available")]
    NoRuntime,
}
