//! Move quality labels and the score sources that feed them

use rand::Rng;
use serde::{Deserialize, Serialize};
use shakmaty::{Color, Square};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Quality of a played move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    Brilliant,
    Great,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "brilliant",
            MoveQuality::Great => "great",
            MoveQuality::Good => "good",
            MoveQuality::Inaccuracy => "inaccuracy",
            MoveQuality::Mistake => "mistake",
            MoveQuality::Blunder => "blunder",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "Brilliant",
            MoveQuality::Great => "Great",
            MoveQuality::Good => "Good",
            MoveQuality::Inaccuracy => "Inaccuracy",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Blunder => "Blunder",
        }
    }
}

/// Annotations keyed by destination square.
///
/// A later move landing on the same square replaces the earlier label.
pub type MoveQualityMap = BTreeMap<Square, MoveQuality>;

/// Maps a score in pawns to a quality label. Thresholds are strict.
pub fn classify(score: f64) -> MoveQuality {
    match score {
        s if s > 3.0 => MoveQuality::Brilliant,
        s if s > 2.0 => MoveQuality::Great,
        s if s > 1.0 => MoveQuality::Good,
        s if s > -1.0 => MoveQuality::Inaccuracy,
        s if s > -2.0 => MoveQuality::Mistake,
        _ => MoveQuality::Blunder,
    }
}

/// What a scorer knows about the move being annotated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreContext {
    /// Cursor after the move (1 = first move of the game)
    pub cursor: usize,
    pub mover: Color,
    /// White-perspective evaluation before the move, in pawns
    pub before: Option<f64>,
    /// White-perspective evaluation after the move, in pawns
    pub after: Option<f64>,
}

impl ScoreContext {
    pub fn new(cursor: usize, before: Option<f64>, after: Option<f64>) -> Self {
        // Odd cursors follow a white move.
        let mover = if cursor % 2 == 1 { Color::White } else { Color::Black };
        Self {
            cursor,
            mover,
            before,
            after,
        }
    }
}

/// Source of the number handed to [`classify`]
pub trait MoveScorer: Send {
    /// Returns `None` while the move cannot be scored yet.
    fn score(&mut self, context: &ScoreContext) -> Option<f64>;
}

/// Scores a move by how much the evaluation moved in the mover's favour.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvalDeltaScorer;

impl MoveScorer for EvalDeltaScorer {
    fn score(&mut self, context: &ScoreContext) -> Option<f64> {
        let delta = context.after? - context.before?;
        Some(match context.mover {
            Color::White => delta,
            Color::Black => -delta,
        })
    }
}

/// Uniform noise in [-2, 2), independent of the position.
///
/// Lets the board markers be exercised without an engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomScorer;

impl MoveScorer for RandomScorer {
    fn score(&mut self, _context: &ScoreContext) -> Option<f64> {
        Some(rand::rng().random_range(-2.0..2.0))
    }
}

/// Which scorer a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    #[default]
    EvalDelta,
    Random,
}

impl ScorerKind {
    pub fn build(self) -> Box<dyn MoveScorer> {
        match self {
            ScorerKind::EvalDelta => Box::new(EvalDeltaScorer),
            ScorerKind::Random => Box::new(RandomScorer),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eval-delta" | "eval_delta" | "delta" => Ok(ScorerKind::EvalDelta),
            "random" => Ok(ScorerKind::Random),
            other => Err(format!("unknown scorer: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(4.0), MoveQuality::Brilliant);
        assert_eq!(classify(2.5), MoveQuality::Great);
        assert_eq!(classify(1.5), MoveQuality::Good);
        assert_eq!(classify(0.0), MoveQuality::Inaccuracy);
        assert_eq!(classify(-1.5), MoveQuality::Mistake);
        assert_eq!(classify(-3.0), MoveQuality::Blunder);
    }

    #[test]
    fn test_classify_boundaries_are_strict() {
        assert_eq!(classify(3.0), MoveQuality::Great);
        assert_eq!(classify(2.0), MoveQuality::Good);
        assert_eq!(classify(1.0), MoveQuality::Inaccuracy);
        assert_eq!(classify(-1.0), MoveQuality::Mistake);
        assert_eq!(classify(-2.0), MoveQuality::Blunder);
    }

    #[test]
    fn test_eval_delta_needs_both_sides() {
        let mut scorer = EvalDeltaScorer;
        assert_eq!(scorer.score(&ScoreContext::new(1, None, Some(0.3))), None);
        assert_eq!(scorer.score(&ScoreContext::new(1, Some(0.3), None)), None);
    }

    #[test]
    fn test_eval_delta_uses_mover_perspective() {
        let mut scorer = EvalDeltaScorer;

        // White improved its own evaluation by 1.5
        let white = ScoreContext::new(3, Some(0.5), Some(2.0));
        assert_eq!(white.mover, Color::White);
        assert_eq!(scorer.score(&white), Some(1.5));

        // Black let the evaluation climb by 1.5 in white's favour
        let black = ScoreContext::new(4, Some(0.5), Some(2.0));
        assert_eq!(black.mover, Color::Black);
        assert_eq!(scorer.score(&black), Some(-1.5));
    }

    #[test]
    fn test_random_scorer_range() {
        let mut scorer = RandomScorer;
        let context = ScoreContext::new(1, None, None);
        for _ in 0..200 {
            let score = scorer.score(&context).unwrap();
            assert!((-2.0..2.0).contains(&score));
        }
    }

    #[test]
    fn test_scorer_kind_parsing() {
        assert_eq!("eval-delta".parse(), Ok(ScorerKind::EvalDelta));
        assert_eq!("Random".parse(), Ok(ScorerKind::Random));
        assert!("oracle".parse::<ScorerKind>().is_err());
    }

    #[test]
    fn test_labels_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&MoveQuality::Blunder).unwrap(), "\"blunder\"");
        assert_eq!(MoveQuality::Great.display_name(), "Great");
    }
}
