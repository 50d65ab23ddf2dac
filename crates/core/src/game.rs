//! Fetched game records

use serde::{Deserialize, Serialize};

use crate::parser::MoveList;

/// A finished game as reported by the game source. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub white: String,
    pub black: String,
    /// "1-0", "0-1" or "½-½"
    pub result: String,
    /// End of the game, RFC 3339
    pub date: String,
    /// Full PGN including the move-text
    pub pgn: String,
}

impl GameRecord {
    /// Main line of the game. Derived on demand; never stored on the record.
    pub fn move_list(&self) -> MoveList {
        MoveList::from_move_text(&self.pgn)
    }

    pub fn summary(&self) -> String {
        format!("{} vs {} - {}", self.white, self.black, self.result)
    }
}
