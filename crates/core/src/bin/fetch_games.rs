//! Quick check of the Chess.com game source

use chess_review_core::replay;
use chess_review_core::{ChessComClient, ReviewConfig};

#[tokio::main]
async fn main() {
    let username = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: fetch_games <username>");
        std::process::exit(1);
    });

    println!("Fetching games for: {}", username);

    let config = ReviewConfig::from_env();
    let client = match ChessComClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    let games = match client.try_fetch_games(&username).await {
        Ok(games) => games,
        Err(e) => {
            eprintln!("Failed to fetch games: {}", e);
            std::process::exit(1);
        }
    };

    println!("Found {} games this month:\n", games.len());
    for game in &games {
        println!("  {} [{}]", game.summary(), game.date);
    }

    if let Some(latest) = games.last() {
        let moves = latest.move_list();
        let line = replay::replay(&moves, moves.len());
        println!("\nMost recent game ({} moves):", moves.len());
        println!("  {}", moves.tokens().join(" "));
        println!("  Final position: {}", line.board_position());
    }
}
