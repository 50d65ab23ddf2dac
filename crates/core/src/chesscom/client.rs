//! Chess.com API client for fetching a player's recent games

use chrono::{Datelike, Utc};
use reqwest::Client;

use super::types::*;
use crate::config::ReviewConfig;
use crate::error::{Error, Result};
use crate::game::GameRecord;

pub struct ChessComClient {
    client: Client,
    base_url: String,
    max_games: usize,
}

impl ChessComClient {
    pub fn new(config: &ReviewConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.chesscom_base_url.clone(),
            max_games: config.max_games,
        })
    }

    /// Most recent games of the current month, oldest first.
    pub async fn try_fetch_games(&self, username: &str) -> Result<Vec<GameRecord>> {
        let now = Utc::now();
        let url = format!(
            "{}/player/{}/games/{}/{:02}",
            self.base_url,
            username.trim(),
            now.year(),
            now.month()
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::ChessCom(format!("API error: {}", response.status())));
        }

        let text = response.text().await?;
        let games = parse_archive(&text, self.max_games)?;
        tracing::info!(username, count = games.len(), "fetched games");
        Ok(games)
    }

    /// Like [`try_fetch_games`](Self::try_fetch_games), but a failure is
    /// logged and reported as no games.
    pub async fn fetch_games(&self, username: &str) -> Vec<GameRecord> {
        match self.try_fetch_games(username).await {
            Ok(games) => games,
            Err(e) => {
                tracing::warn!(username, error = %e, "Error fetching games");
                Vec::new()
            }
        }
    }
}

/// Maps a monthly archive to game records, keeping the last `max` entries.
pub fn parse_archive(json: &str, max: usize) -> Result<Vec<GameRecord>> {
    let archive: MonthlyArchive = serde_json::from_str(json)?;
    let skip = archive.games.len().saturating_sub(max);

    let games = archive
        .games
        .into_iter()
        .skip(skip)
        .filter_map(|game| {
            let uuid = game.uuid.clone();
            let record = game.into_record();
            if record.is_none() {
                tracing::debug!(game = %uuid, "skipping game without PGN");
            }
            record
        })
        .collect();

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const ARCHIVE: &str = r#"{
        "games": [
            {
                "uuid": "a1",
                "pgn": "[Event \"Live Chess\"]\n\n1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0",
                "end_time": 1714564800,
                "rules": "chess",
                "white": {"username": "alice", "rating": 1500, "result": "win"},
                "black": {"username": "bob", "rating": 1480, "result": "checkmated"}
            },
            {
                "uuid": "a2",
                "pgn": "1. d4 d5 2. c4 e6 0-1",
                "end_time": 1714568400,
                "white": {"username": "alice", "result": "resigned"},
                "black": {"username": "carol", "result": "win"}
            },
            {
                "uuid": "a3",
                "end_time": 1714572000,
                "white": {"username": "alice", "result": "abandoned"},
                "black": {"username": "dave", "result": "win"}
            },
            {
                "uuid": "a4",
                "pgn": "1. e4 c5 1/2-1/2",
                "end_time": 1714575600,
                "white": {"username": "erin", "result": "agreed"},
                "black": {"username": "alice", "result": "agreed"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_archive_maps_records() {
        let games = parse_archive(ARCHIVE, 10).unwrap();
        assert_eq!(games.len(), 3);

        let first = &games[0];
        assert_eq!(first.id, "a1");
        assert_eq!(first.white, "alice");
        assert_eq!(first.black, "bob");
        assert_eq!(first.result, "1-0");
        assert_eq!(first.date, "2024-05-01T12:00:00.000Z");
        assert_eq!(first.move_list().len(), 7);

        assert_eq!(games[1].result, "0-1");
        assert_eq!(games[2].result, "½-½");
    }

    #[test]
    fn test_parse_archive_keeps_latest() {
        let games = parse_archive(ARCHIVE, 2).unwrap();
        // a3 has no PGN, so only a4 remains of the last two
        assert_eq!(games.iter().map(|g| g.id.as_str()).collect::<Vec<_>>(), ["a4"]);
    }

    #[test]
    fn test_parse_archive_rejects_garbage() {
        assert!(parse_archive("<html>", 10).is_err());
        assert!(parse_archive("{}", 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_no_games() {
        let config = ReviewConfig {
            chesscom_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(2),
            ..ReviewConfig::default()
        };
        let client = ChessComClient::new(&config).unwrap();

        assert!(client.try_fetch_games("alice").await.is_err());
        assert!(client.fetch_games("alice").await.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_real_games() {
        let client = ChessComClient::new(&ReviewConfig::default()).unwrap();
        let games = client.fetch_games("hikaru").await;
        for game in &games {
            println!("{} ({})", game.summary(), game.date);
        }
    }
}
