//! Move navigation over a recorded game
//!
//! The cursor counts how many moves of the recorded line are applied. It is
//! only changed by the navigation operations, which clamp instead of failing.
//! The consequences of a change (last move, annotations, analysis) are not
//! applied by the operations themselves: callers pick them up through
//! [`Navigator::refresh`].

use shakmaty::san::SanPlus;
use shakmaty::{Role, Square};
use std::str::FromStr;

use crate::game::GameRecord;
use crate::parser::MoveList;
use crate::quality::{MoveQuality, MoveQualityMap};
use crate::replay::{self, BoardPosition, LastMove};

/// A move proposed from the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl UserMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }
}

/// How board moves relate to the recorded line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserMovePolicy {
    /// Any legal move steps forward along the recorded line
    #[default]
    Advance,
    /// Only the recorded next move is accepted
    Recorded,
}

impl FromStr for UserMovePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advance" => Ok(UserMovePolicy::Advance),
            "recorded" => Ok(UserMovePolicy::Recorded),
            other => Err(format!("unknown user move policy: {other}")),
        }
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    record: Option<GameRecord>,
    moves: MoveList,
    cursor: usize,
    last_move: Option<LastMove>,
    qualities: MoveQualityMap,
    policy: UserMovePolicy,
    changed: bool,
}

impl Navigator {
    pub fn new(policy: UserMovePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Loads a game and rewinds to the start.
    pub fn select_game(&mut self, record: &GameRecord) {
        self.moves = record.move_list();
        self.record = Some(record.clone());
        self.cursor = 0;
        self.last_move = None;
        self.qualities.clear();
        self.changed = true;
        tracing::debug!(game = %record.id, moves = self.moves.len(), "game selected");
    }

    pub fn go_first(&mut self) -> bool {
        self.set_cursor(0)
    }

    pub fn go_prev(&mut self) -> bool {
        self.set_cursor(self.cursor.saturating_sub(1))
    }

    pub fn go_next(&mut self) -> bool {
        self.set_cursor((self.cursor + 1).min(self.moves.len()))
    }

    pub fn go_last(&mut self) -> bool {
        self.set_cursor(self.moves.len())
    }

    /// Steps forward when the board proposes a legal move.
    ///
    /// Rejected (returns `false`, nothing changes) when the move is illegal,
    /// the game is already at its end, or the policy demands the recorded
    /// move and the proposal differs.
    pub fn apply_user_move(&mut self, proposed: UserMove) -> bool {
        if self.cursor >= self.moves.len() {
            return false;
        }

        let current = replay::replay(&self.moves, self.cursor);
        let Some(mv) = replay::legal_move(&current.position, proposed.from, proposed.to, proposed.promotion)
        else {
            tracing::debug!(from = %proposed.from, to = %proposed.to, "ignoring illegal board move");
            return false;
        };

        if self.policy == UserMovePolicy::Recorded {
            let recorded = self
                .moves
                .get(self.cursor)
                .and_then(|token| token.parse::<SanPlus>().ok())
                .and_then(|san| san.san.to_move(&current.position).ok());
            if recorded != Some(mv) {
                tracing::debug!(from = %proposed.from, to = %proposed.to, "board move leaves the recorded line");
                return false;
            }
        }

        self.set_cursor(self.cursor + 1)
    }

    /// Current position, replayed from scratch.
    pub fn position(&self) -> BoardPosition {
        replay::replay(&self.moves, self.cursor).board_position()
    }

    /// Applies the consequences of the last change: recomputes the last move
    /// and reports the new cursor. Returns `None` when nothing changed since
    /// the previous call.
    pub fn refresh(&mut self) -> Option<usize> {
        if !std::mem::take(&mut self.changed) {
            return None;
        }
        self.last_move = replay::replay(&self.moves, self.cursor).last_move;
        Some(self.cursor)
    }

    pub fn annotate(&mut self, square: Square, quality: MoveQuality) {
        self.qualities.insert(square, quality);
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &MoveList {
        &self.moves
    }

    pub fn record(&self) -> Option<&GameRecord> {
        self.record.as_ref()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor < self.moves.len()
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn qualities(&self) -> &MoveQualityMap {
        &self.qualities
    }

    fn set_cursor(&mut self, cursor: usize) -> bool {
        if cursor == self.cursor {
            return false;
        }
        tracing::debug!(from = self.cursor, to = cursor, "cursor moved");
        self.cursor = cursor;
        self.changed = true;
        true
    }
}
