//! Chess.com game source

pub mod client;
pub mod types;

pub use client::{parse_archive, ChessComClient};
