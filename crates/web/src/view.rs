//! What the page shows for the current state of a review

use serde::Serialize;
use shakmaty::{Color, File, Position, Rank, Square};

use chess_review_core::replay;
use chess_review_core::{GameRecord, MoveQuality, ReviewSession};

const ADVICE_THRESHOLD: f64 = 1.5;

#[derive(Debug, Clone, Serialize)]
pub struct SquareView {
    pub name: String,
    pub dark: bool,
    /// FEN letter of the piece, if any
    pub piece: Option<char>,
    pub glyph: String,
    pub highlight: bool,
    pub quality: Option<MoveQuality>,
}

impl SquareView {
    pub fn css_class(&self) -> String {
        let mut class = String::from(if self.dark { "square dark" } else { "square light" });
        if self.highlight {
            class.push_str(" last-move");
        }
        if let Some(quality) = self.quality {
            class.push_str(" move-quality-");
            class.push_str(quality.as_str());
        }
        class
    }

    pub fn quality_title(&self) -> &'static str {
        self.quality.map(|q| q.display_name()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineView {
    /// Signed score, e.g. "+0.35"
    pub score: String,
    pub depth: u8,
    pub target_depth: u8,
    /// First moves of the principal variation in SAN
    pub line: Vec<String>,
    pub advice: &'static str,
    /// "winning", "losing" or "even"
    pub tone: &'static str,
    /// Height of the evaluation bar in percent
    pub bar: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveView {
    pub label: String,
    pub san: String,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub game: Option<String>,
    /// "start" or the FEN of the position on the board
    pub position: String,
    pub squares: Vec<SquareView>,
    pub cursor: usize,
    pub total: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub moves: Vec<MoveView>,
    pub depth: u8,
    pub engine: Option<EngineView>,
    pub best_move: Option<String>,
}

impl BoardView {
    pub fn from_session(session: &ReviewSession) -> Self {
        let navigator = session.navigator();
        let current = replay::replay(navigator.moves(), navigator.cursor());
        let board = current.position.board();
        let last_move = navigator.last_move();
        let qualities = navigator.qualities();

        let mut squares = Vec::with_capacity(64);
        for rank in (0..8u32).rev() {
            for file in 0..8u32 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let piece = board.piece_at(square);
                squares.push(SquareView {
                    name: square.to_string(),
                    dark: (file + rank) % 2 == 0,
                    piece: piece.map(|p| p.char()),
                    glyph: piece.map(|p| glyph(p.char()).to_string()).unwrap_or_default(),
                    highlight: last_move.is_some_and(|m| m.from == square || m.to == square),
                    quality: qualities.get(&square).copied(),
                });
            }
        }

        let moves = navigator
            .moves()
            .tokens()
            .iter()
            .enumerate()
            .map(|(i, san)| MoveView {
                label: if i % 2 == 0 {
                    format!("{}.", i / 2 + 1)
                } else {
                    format!("{}...", i / 2 + 1)
                },
                san: san.clone(),
                current: i + 1 == navigator.cursor(),
            })
            .collect();

        let engine = session.evaluation().map(|eval| {
            let mut line = replay::pv_to_san(&current.position, &eval.pv);
            line.truncate(5);
            let white = white_score(eval.score, current.position.turn());
            EngineView {
                score: eval.to_string(),
                depth: eval.depth,
                target_depth: session.depth(),
                line,
                advice: advice(white),
                tone: tone(white),
                bar: bar(white),
            }
        });

        let best_move = session
            .best_move()
            .map(|mv| {
                replay::pv_to_san(&current.position, &[mv.to_string()])
                    .pop()
                    .unwrap_or_else(|| mv.to_string())
            });

        Self {
            game: navigator.record().map(GameRecord::summary),
            position: session.position().to_string(),
            squares,
            cursor: navigator.cursor(),
            total: navigator.len(),
            can_go_back: navigator.can_go_back(),
            can_go_forward: navigator.can_go_forward(),
            moves,
            depth: session.depth(),
            engine,
            best_move,
        }
    }
}

/// Engine scores are from the side to move; the panel reads them from White's side
fn white_score(score: f64, turn: Color) -> f64 {
    match turn {
        Color::White => score,
        Color::Black => -score,
    }
}

pub fn advice(score: f64) -> &'static str {
    if score > ADVICE_THRESHOLD {
        "Strong advantage for White. Look for tactical opportunities."
    } else if score < -ADVICE_THRESHOLD {
        "Black has the advantage. Maintain defensive posture."
    } else {
        "Position is balanced. Focus on strategic improvements."
    }
}

fn tone(score: f64) -> &'static str {
    if score > 2.0 {
        "winning"
    } else if score < -2.0 {
        "losing"
    } else {
        "even"
    }
}

fn bar(score: f64) -> u8 {
    ((score + 4.0) * 10.0).clamp(0.0, 100.0) as u8
}

fn glyph(piece: char) -> char {
    match piece {
        'K' => '♔',
        'Q' => '♕',
        'R' => '♖',
        'B' => '♗',
        'N' => '♘',
        'P' => '♙',
        'k' => '♚',
        'q' => '♛',
        'r' => '♜',
        'b' => '♝',
        'n' => '♞',
        'p' => '♟',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advice_thresholds() {
        assert!(advice(1.6).starts_with("Strong advantage for White"));
        assert!(advice(-1.6).starts_with("Black has the advantage"));
        assert!(advice(1.5).starts_with("Position is balanced"));
        assert!(advice(0.0).starts_with("Position is balanced"));
    }

    #[test]
    fn test_panel_reads_from_whites_side() {
        // Black to move and two pawns up
        let white = white_score(2.5, Color::Black);
        assert!(advice(white).starts_with("Black has the advantage"));
        assert_eq!(tone(white), "losing");
        assert_eq!(bar(white), 15);

        let white = white_score(2.5, Color::White);
        assert!(advice(white).starts_with("Strong advantage for White"));
        assert_eq!(tone(white), "winning");
        assert_eq!(bar(white), 65);
    }

    #[test]
    fn test_square_classes() {
        let square = SquareView {
            name: "e4".to_string(),
            dark: false,
            piece: Some('P'),
            glyph: "♙".to_string(),
            highlight: true,
            quality: Some(MoveQuality::Blunder),
        };
        assert_eq!(square.css_class(), "square light last-move move-quality-blunder");
        assert_eq!(square.quality_title(), "Blunder");
    }
}
