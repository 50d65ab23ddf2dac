use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::EnvFilter;

use chess_review_core::{ChessComClient, GameRecord, ReviewConfig, ReviewSession};

mod routes;
mod view;

pub struct AppState {
    pub session: Mutex<ReviewSession>,
    pub games: Mutex<Vec<GameRecord>>,
    /// Id of the game on the board
    pub selected: Mutex<Option<String>>,
    pub username: Mutex<Option<String>>,
    pub banner: Mutex<Option<String>>,
    pub chesscom: ChessComClient,
}

impl AppState {
    pub fn new(config: &ReviewConfig) -> chess_review_core::Result<Self> {
        Ok(Self {
            session: Mutex::new(ReviewSession::new(config)),
            games: Mutex::new(Vec::new()),
            selected: Mutex::new(None),
            username: Mutex::new(None),
            banner: Mutex::new(None),
            chesscom: ChessComClient::new(config)?,
        })
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chess_review_web=info,chess_review_core=info,tower_http=info")),
        )
        .init();

    let config = ReviewConfig::from_env();
    tracing::info!(engine = %config.engine_path.display(), depth = config.engine_depth, "starting");

    let state = match AppState::new(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "failed to create application state");
            std::process::exit(1);
        }
    };

    let app = routes::router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
