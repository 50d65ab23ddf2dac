//! PGN move-text parsing into a replayable move list

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};
use std::io::Cursor;
use std::ops::ControlFlow;

use crate::error::{Error, Result};

/// Ordered SAN tokens of a game's main line.
///
/// Every token is playable in sequence from the standard starting position;
/// construction stops at the first token that is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    tokens: Vec<String>,
}

impl MoveList {
    /// Derives the main line from a PGN blob, falling back to an empty list
    /// when the text cannot be read.
    pub fn from_move_text(pgn: &str) -> Self {
        match parse_move_text(pgn) {
            Ok(moves) => moves,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable move text, using an empty move list");
                Self::default()
            }
        }
    }

    /// Builds a move list from bare SAN tokens such as `["e4", "e5", "Nf3"]`.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut position = Chess::default();
        let mut moves = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            let Ok(san) = token.parse::<SanPlus>() else {
                tracing::warn!(token, ply = moves.len(), "unparsable move token, truncating");
                break;
            };
            let Ok(mv) = san.san.to_move(&position) else {
                tracing::warn!(token, ply = moves.len(), "illegal move token, truncating");
                break;
            };
            position.play_unchecked(mv);
            moves.push(token.to_string());
        }

        Self { tokens: moves }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

struct MainLine {
    moves: Vec<String>,
    position: Chess,
    playable: bool,
}

struct MoveTextParser;

impl Visitor for MoveTextParser {
    type Tags = ();
    type Movetext = MainLine;
    type Output = MoveList;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _tags: &mut Self::Tags,
        _name: &[u8],
        _value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(MainLine {
            moves: Vec::new(),
            position: Chess::default(),
            playable: true,
        })
    }

    fn san(&mut self, line: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !line.playable {
            return ControlFlow::Continue(());
        }

        match san.san.to_move(&line.position) {
            Ok(mv) => {
                line.position.play_unchecked(mv);
                line.moves.push(san.to_string());
            }
            Err(_) => {
                tracing::warn!(san = %san, ply = line.moves.len(), "illegal move in PGN, truncating");
                line.playable = false;
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _line: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, line: Self::Movetext) -> Self::Output {
        MoveList { tokens: line.moves }
    }
}

/// Reads the first game of a PGN blob and returns its main line.
///
/// Text without any game yields an empty list.
pub fn parse_move_text(pgn: &str) -> Result<MoveList> {
    let mut parser = MoveTextParser;
    let mut reader = pgn_reader::Reader::new(Cursor::new(pgn.as_bytes()));

    match reader.read_game(&mut parser) {
        Ok(Some(moves)) => Ok(moves),
        Ok(None) => Ok(MoveList::default()),
        Err(e) => Err(Error::Pgn(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "alice"]
[Black "bob"]
[Result "1-0"]

1. e4 {[%clk 0:09:58]} 1... e5 2. Nf3 Nc6 (2... d6 3. d4) 3. Bb5 a6 1-0
"#;

    #[test]
    fn test_parse_main_line() {
        let moves = parse_move_text(SAMPLE_PGN).unwrap();
        assert_eq!(moves.tokens(), ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn test_empty_move_text() {
        assert!(MoveList::from_move_text("").is_empty());
        assert!(MoveList::from_move_text("[Event \"?\"]\n\n*\n").is_empty());
    }

    #[test]
    fn test_illegal_move_truncates() {
        let moves = MoveList::from_move_text("1. e4 e5 2. Ke3 Nc6 *");
        assert_eq!(moves.tokens(), ["e4", "e5"]);
    }

    #[test]
    fn test_check_suffix_is_kept() {
        let moves = MoveList::from_move_text("1. e4 e5 2. Bc4 Nc6 3. Bxf7+ Kxf7 *");
        assert_eq!(moves.get(4), Some("Bxf7+"));
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn test_from_tokens() {
        let moves = MoveList::from_tokens(["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(moves.len(), 4);

        let truncated = MoveList::from_tokens(["e4", "e5", "Qh9", "Nc6"]);
        assert_eq!(truncated.tokens(), ["e4", "e5"]);
    }
}
