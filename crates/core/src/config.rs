//! Runtime configuration read from the environment

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::{DEFAULT_DEPTH, MAX_DEPTH};
use crate::navigator::UserMovePolicy;
use crate::quality::ScorerKind;

pub const DEFAULT_CHESSCOM_BASE: &str = "https://api.chess.com/pub";

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    pub engine_path: PathBuf,
    pub engine_depth: u8,
    pub scorer: ScorerKind,
    pub user_moves: UserMovePolicy,
    pub chesscom_base_url: String,
    pub max_games: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("stockfish"),
            engine_depth: DEFAULT_DEPTH,
            scorer: ScorerKind::default(),
            user_moves: UserMovePolicy::default(),
            chesscom_base_url: DEFAULT_CHESSCOM_BASE.to_string(),
            max_games: 10,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("chess-review/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ReviewConfig {
    /// Reads the configuration from the environment. Unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            engine_path: lookup("CHESS_REVIEW_ENGINE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.engine_path),
            engine_depth: parsed(&lookup, "CHESS_REVIEW_DEPTH")
                .map(|depth: u32| depth.clamp(1, u32::from(MAX_DEPTH)) as u8)
                .unwrap_or(defaults.engine_depth),
            scorer: parsed(&lookup, "CHESS_REVIEW_SCORER").unwrap_or(defaults.scorer),
            user_moves: parsed(&lookup, "CHESS_REVIEW_USER_MOVES").unwrap_or(defaults.user_moves),
            chesscom_base_url: lookup("CHESSCOM_API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.chesscom_base_url),
            max_games: parsed(&lookup, "CHESS_REVIEW_MAX_GAMES").unwrap_or(defaults.max_games),
            request_timeout: parsed(&lookup, "CHESS_REVIEW_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            user_agent: defaults.user_agent,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
