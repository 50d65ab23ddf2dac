//! Parser module for reading chess game formats
//!
//! Currently supports:
//! - PGN move-text (Portable Game Notation)

pub mod pgn;

pub use pgn::{parse_move_text, MoveList};
