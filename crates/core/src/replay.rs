//! Replays a move list through the rules engine
//!
//! Positions are never cached: every query replays from the starting
//! position, so a position is always a function of (moves, count).

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, File, Move, Position, Role, Square};
use std::fmt;

use crate::parser::MoveList;

/// Derived board position for a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPosition {
    /// Nothing played yet
    Start,
    /// Position after at least one move
    Fen(Fen),
}

impl BoardPosition {
    /// Concrete FEN, resolving `Start` to the standard initial position
    pub fn fen(&self) -> Fen {
        match self {
            BoardPosition::Start => Fen::from_position(&Chess::default(), EnPassantMode::Legal),
            BoardPosition::Fen(fen) => fen.clone(),
        }
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardPosition::Start => write!(f, "start"),
            BoardPosition::Fen(fen) => write!(f, "{}", fen),
        }
    }
}

/// The most recently applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub from: Square,
    /// Destination; the king's target square for castling
    pub to: Square,
    pub role: Role,
}

impl LastMove {
    fn from_move(mv: &Move) -> Option<Self> {
        Some(LastMove {
            from: mv.from()?,
            to: target_square(mv),
            role: mv.role(),
        })
    }
}

/// Result of replaying the first `applied` moves of a list
#[derive(Debug, Clone)]
pub struct Replay {
    pub position: Chess,
    pub last_move: Option<LastMove>,
    pub applied: usize,
}

impl Replay {
    pub fn board_position(&self) -> BoardPosition {
        if self.applied == 0 {
            BoardPosition::Start
        } else {
            BoardPosition::Fen(Fen::from_position(&self.position, EnPassantMode::Legal))
        }
    }
}

/// Replays `moves[0..count)` from the starting position.
pub fn replay(moves: &MoveList, count: usize) -> Replay {
    let mut position = Chess::default();
    let mut last_move = None;
    let mut applied = 0;

    for token in moves.tokens().iter().take(count) {
        let Some(mv) = token
            .parse::<SanPlus>()
            .ok()
            .and_then(|san| san.san.to_move(&position).ok())
        else {
            tracing::warn!(token = %token, ply = applied, "replay stopped at unplayable move");
            break;
        };
        last_move = LastMove::from_move(&mv);
        position.play_unchecked(mv);
        applied += 1;
    }

    Replay {
        position,
        last_move,
        applied,
    }
}

/// Destination square as a board click sees it.
///
/// Castling moves are encoded king-takes-rook, so the king's target square is
/// derived from the side the rook stands on.
fn target_square(mv: &Move) -> Square {
    match *mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        _ => mv.to(),
    }
}

/// Finds the legal move matching a square-to-square proposal.
///
/// Promotions default to a queen when no piece is given.
pub fn legal_move(position: &Chess, from: Square, to: Square, promotion: Option<Role>) -> Option<Move> {
    position.legal_moves().into_iter().find(|mv| {
        mv.from() == Some(from)
            && target_square(mv) == to
            && match mv.promotion() {
                Some(role) => role == promotion.unwrap_or(Role::Queen),
                None => true,
            }
    })
}

/// Converts an engine line in UCI notation to SAN, stopping at the first
/// move that does not apply.
pub fn pv_to_san(position: &Chess, pv: &[String]) -> Vec<String> {
    let mut position = position.clone();
    let mut line = Vec::with_capacity(pv.len());

    for uci in pv {
        let Some(mv) = uci
            .parse::<UciMove>()
            .ok()
            .and_then(|uci| uci.to_move(&position).ok())
        else {
            break;
        };
        line.push(SanPlus::from_move_and_play_unchecked(&mut position, mv).to_string());
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(tokens: &[&str]) -> MoveList {
        MoveList::from_tokens(tokens.iter().copied())
    }

    #[test]
    fn test_replay_nothing_is_start() {
        let replay = replay(&moves(&["e4", "e5"]), 0);
        assert_eq!(replay.board_position(), BoardPosition::Start);
        assert!(replay.last_move.is_none());
        assert_eq!(replay.board_position().to_string(), "start");
    }

    #[test]
    fn test_start_resolves_to_initial_fen() {
        assert_eq!(
            BoardPosition::Start.fen().to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_replay_last_move() {
        let replay = replay(&moves(&["e4", "e5", "Nf3"]), 3);
        let last = replay.last_move.unwrap();
        assert_eq!(last.from, Square::G1);
        assert_eq!(last.to, Square::F3);
        assert_eq!(last.role, Role::Knight);
        assert_eq!(
            replay.board_position().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_castling_targets_king_square() {
        let line = moves(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"]);
        let last = replay(&line, 7).last_move.unwrap();
        assert_eq!(last.from, Square::E1);
        assert_eq!(last.to, Square::G1);
        assert_eq!(last.role, Role::King);
    }

    #[test]
    fn test_count_past_end_is_clamped() {
        let replay = replay(&moves(&["d4"]), 10);
        assert_eq!(replay.applied, 1);
    }

    #[test]
    fn test_legal_move_lookup() {
        let position = Chess::default();
        assert!(legal_move(&position, Square::E2, Square::E4, None).is_some());
        assert!(legal_move(&position, Square::E2, Square::E5, None).is_none());
        assert!(legal_move(&position, Square::E7, Square::E5, None).is_none());
    }

    #[test]
    fn test_legal_castle_by_king_target() {
        let line = moves(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]);
        let position = replay(&line, 6).position;
        let castle = legal_move(&position, Square::E1, Square::G1, None).unwrap();
        assert!(castle.is_castle());
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let fen: Fen = "8/4P3/8/8/8/8/k7/7K w - - 0 1".parse().unwrap();
        let position: Chess = fen.into_position(shakmaty::CastlingMode::Standard).unwrap();

        let queen = legal_move(&position, Square::E7, Square::E8, None).unwrap();
        assert_eq!(queen.promotion(), Some(Role::Queen));

        let knight = legal_move(&position, Square::E7, Square::E8, Some(Role::Knight)).unwrap();
        assert_eq!(knight.promotion(), Some(Role::Knight));
    }

    #[test]
    fn test_pv_to_san() {
        let pv: Vec<String> = ["e2e4", "e7e5", "g1f3", "zz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(pv_to_san(&Chess::default(), &pv), ["e4", "e5", "Nf3"]);
    }
}
