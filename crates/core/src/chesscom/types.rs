//! Chess.com published-data API types

use chrono::{DateTime, SecondsFormat};
use serde::Deserialize;

use crate::game::GameRecord;

/// One month of a player's games
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyArchive {
    #[serde(default)]
    pub games: Vec<ChessComGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChessComGame {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: Option<String>,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub time_class: Option<String>,
    pub white: ArchivePlayer,
    pub black: ArchivePlayer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchivePlayer {
    pub username: String,
    #[serde(default)]
    pub rating: Option<u16>,
    /// "win", "checkmated", "agreed", "timeout", ...
    #[serde(default)]
    pub result: String,
}

impl ChessComGame {
    pub fn result(&self) -> &'static str {
        if self.white.result == "win" {
            "1-0"
        } else if self.black.result == "win" {
            "0-1"
        } else {
            "½-½"
        }
    }

    /// End of the game as RFC 3339 UTC
    pub fn date(&self) -> String {
        DateTime::from_timestamp(self.end_time, 0)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `None` when the archive entry has no PGN
    pub fn into_record(self) -> Option<GameRecord> {
        let result = self.result().to_string();
        let date = self.date();
        let pgn = self.pgn.filter(|pgn| !pgn.trim().is_empty())?;
        Some(GameRecord {
            id: self.uuid,
            white: self.white.username,
            black: self.black.username,
            result,
            date,
            pgn,
        })
    }
}
