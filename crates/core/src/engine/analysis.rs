//! Types for engine output and the UCI line parser

use std::fmt;

/// One streamed evaluation of the position being searched
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    /// Pawns from the side to move's point of view (centipawns / 100)
    pub score: f64,
    /// Depth reached so far
    pub depth: u8,
    /// Principal variation in UCI notation
    pub pv: Vec<String>,
}

impl EvaluationResult {
    pub fn best_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.score >= 0.0 {
            write!(f, "+{:.2}", self.score)
        } else {
            write!(f, "{:.2}", self.score)
        }
    }
}

/// A recognised line from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Info(EvaluationResult),
    /// End of a search; `None` for `bestmove (none)`
    BestMove(Option<String>),
}

/// Parses one line of engine output. Anything that is not a scored `info`
/// line or a `bestmove` line yields `None`.
pub fn parse_line(line: &str) -> Option<EngineOutput> {
    let line = line.trim();
    if line.starts_with("info ") {
        parse_info_line(line).map(EngineOutput::Info)
    } else if line == "bestmove" || line.starts_with("bestmove ") {
        let best_move = line
            .split_whitespace()
            .nth(1)
            .filter(|mv| *mv != "(none)")
            .map(str::to_string);
        Some(EngineOutput::BestMove(best_move))
    } else {
        None
    }
}

/// Parses `info depth <d> ... score cp <c> ... pv <moves...>`.
///
/// All three fields are required; mate scores are not reported.
fn parse_info_line(line: &str) -> Option<EvaluationResult> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut depth = None;
    let mut centipawns = None;
    let mut pv = Vec::new();
    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|d| d.parse::<u8>().ok());
                i += 2;
            }
            "score" => {
                if parts.get(i + 1) == Some(&"cp") {
                    centipawns = parts.get(i + 2).and_then(|c| c.parse::<i32>().ok());
                }
                i += 3;
            }
            "pv" => {
                // Everything after "pv" is the principal variation
                pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            // Free text until the end of the line
            "string" => break,
            _ => {
                i += 1;
            }
        }
    }

    if pv.is_empty() {
        return None;
    }

    Some(EvaluationResult {
        score: f64::from(centipawns?) / 100.0,
        depth: depth?,
        pv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scored_info() {
        let line = "info depth 12 seldepth 18 multipv 1 score cp -47 nodes 120345 nps 900000 time 133 pv d7d5 c2c4 e7e6";
        let Some(EngineOutput::Info(eval)) = parse_line(line) else {
            panic!("expected an evaluation");
        };
        assert_eq!(eval.depth, 12);
        assert_eq!(eval.score, -0.47);
        assert_eq!(eval.pv, ["d7d5", "c2c4", "e7e6"]);
        assert_eq!(eval.best_move(), Some("d7d5"));
    }

    #[test]
    fn test_bounds_after_score_are_skipped() {
        let line = "info depth 9 score cp 30 upperbound nodes 10 pv e2e4";
        let Some(EngineOutput::Info(eval)) = parse_line(line) else {
            panic!("expected an evaluation");
        };
        assert_eq!(eval.score, 0.3);
        assert_eq!(eval.pv, ["e2e4"]);
    }

    #[test]
    fn test_incomplete_info_is_dropped() {
        assert_eq!(parse_line("info depth 3 currmove e2e4 currmovenumber 1"), None);
        assert_eq!(parse_line("info depth 10 score cp 20"), None);
        assert_eq!(parse_line("info score cp 20 pv e2e4"), None);
        assert_eq!(parse_line("info depth 10 score mate 3 pv d1h5"), None);
        assert_eq!(parse_line("info depth x score cp 1 pv e2e4"), None);
        assert_eq!(parse_line("info string NNUE evaluation using nn.nnue enabled"), None);
    }

    #[test]
    fn test_other_lines_are_ignored() {
        assert_eq!(parse_line("uciok"), None);
        assert_eq!(parse_line("readyok"), None);
        assert_eq!(parse_line("id name Stockfish 16"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(
            parse_line("bestmove e2e4 ponder e7e5"),
            Some(EngineOutput::BestMove(Some("e2e4".to_string())))
        );
        assert_eq!(parse_line("bestmove (none)"), Some(EngineOutput::BestMove(None)));
    }

    #[test]
    fn test_display_sign() {
        let eval = EvaluationResult {
            score: 0.35,
            depth: 10,
            pv: vec!["e2e4".to_string()],
        };
        assert_eq!(eval.to_string(), "+0.35");
        assert_eq!(
            EvaluationResult { score: -1.2, ..eval }.to_string(),
            "-1.20"
        );
    }
}
