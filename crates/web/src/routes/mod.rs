use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use shakmaty::{Role, Square};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use chess_review_core::engine::MAX_DEPTH;
use chess_review_core::{GameRecord, UserMove};

use crate::view::BoardView;
use crate::{lock, AppState};

const FETCH_FAILED: &str = "Failed to fetch games. Please check the username and try again.";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/games/current/pgn", get(current_pgn))
        .route("/games/:idx/select", post(select_game))
        .route("/nav/:action", post(navigate))
        .route("/move", post(propose_move))
        .route("/depth", post(set_depth))
        .route("/analysis", get(analysis))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub username: Option<String>,
    pub banner: Option<String>,
    pub games: Vec<GameRow>,
    pub board: BoardView,
}

pub struct GameRow {
    pub index: usize,
    pub white: String,
    pub black: String,
    pub result: String,
    pub date: String,
    pub selected: bool,
}

#[derive(Deserialize)]
pub struct SearchForm {
    pub username: String,
}

#[derive(Deserialize)]
pub struct MoveForm {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub promotion: Option<String>,
}

#[derive(Deserialize)]
pub struct DepthForm {
    pub depth: String,
}

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let board = {
        let mut session = lock(&state.session);
        session.poll_events();
        BoardView::from_session(&session)
    };
    let selected = lock(&state.selected).clone();

    let games = lock(&state.games)
        .iter()
        .enumerate()
        .map(|(index, g)| {
            let date = chrono::DateTime::parse_from_rfc3339(&g.date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| g.date.clone());

            GameRow {
                index,
                white: g.white.clone(),
                black: g.black.clone(),
                result: g.result.clone(),
                date,
                selected: selected.as_deref() == Some(g.id.as_str()),
            }
        })
        .collect();

    IndexTemplate {
        title: "Chess Review".to_string(),
        username: lock(&state.username).clone(),
        banner: lock(&state.banner).clone(),
        games,
        board,
    }
}

pub async fn search(State(state): State<Arc<AppState>>, Form(form): Form<SearchForm>) -> Redirect {
    let username = form.username.trim().to_string();
    if username.is_empty() {
        return Redirect::to("/");
    }

    *lock(&state.username) = Some(username.clone());
    tracing::info!(username = %username, "fetching games");

    match state.chesscom.try_fetch_games(&username).await {
        Ok(games) => {
            *lock(&state.games) = games;
            *lock(&state.banner) = None;
        }
        Err(e) => {
            tracing::warn!(username = %username, error = %e, "failed to fetch games");
            lock(&state.games).clear();
            *lock(&state.selected) = None;
            *lock(&state.banner) = Some(FETCH_FAILED.to_string());
        }
    }

    Redirect::to("/")
}

pub async fn select_game(State(state): State<Arc<AppState>>, Path(idx): Path<usize>) -> Redirect {
    let game: Option<GameRecord> = lock(&state.games).get(idx).cloned();
    match game {
        Some(game) => {
            *lock(&state.selected) = Some(game.id.clone());
            let mut session = lock(&state.session);
            session.poll_events();
            session.select_game(&game);
        }
        None => tracing::debug!(idx, "no game at index"),
    }
    Redirect::to("/")
}

/// PGN of the game on the board, as a download
pub async fn current_pgn(State(state): State<Arc<AppState>>) -> Response {
    let pgn = lock(&state.session).navigator().record().map(|record| record.pgn.clone());
    match pgn {
        Some(pgn) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"game.pgn\""),
            ],
            pgn,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No game selected").into_response(),
    }
}

pub async fn navigate(State(state): State<Arc<AppState>>, Path(action): Path<String>) -> Redirect {
    let mut session = lock(&state.session);
    session.poll_events();
    match action.as_str() {
        "first" => {
            session.go_first();
        }
        "prev" => {
            session.go_prev();
        }
        "next" => {
            session.go_next();
        }
        "last" => {
            session.go_last();
        }
        other => tracing::debug!(action = other, "unknown navigation action"),
    }
    Redirect::to("/")
}

pub async fn propose_move(State(state): State<Arc<AppState>>, Form(form): Form<MoveForm>) -> Redirect {
    if let Some(proposed) = parse_move(&form) {
        let mut session = lock(&state.session);
        session.poll_events();
        session.apply_user_move(proposed);
    } else {
        tracing::debug!(from = %form.from, to = %form.to, "unparsable move proposal");
    }
    Redirect::to("/")
}

pub async fn set_depth(State(state): State<Arc<AppState>>, Form(form): Form<DepthForm>) -> Redirect {
    match form.depth.trim().parse::<u32>() {
        Ok(depth) => {
            let depth = depth.clamp(1, u32::from(MAX_DEPTH)) as u8;
            let mut session = lock(&state.session);
            session.poll_events();
            session.set_depth(depth);
        }
        Err(_) => tracing::debug!(depth = %form.depth, "ignoring unparsable depth"),
    }
    Redirect::to("/")
}

pub async fn analysis(State(state): State<Arc<AppState>>) -> Json<BoardView> {
    let mut session = lock(&state.session);
    session.poll_events();
    Json(BoardView::from_session(&session))
}

pub async fn health() -> &'static str {
    "OK"
}

fn parse_move(form: &MoveForm) -> Option<UserMove> {
    let from: Square = form.from.trim().parse().ok()?;
    let to: Square = form.to.trim().parse().ok()?;
    let proposed = UserMove::new(from, to);

    match form.promotion.as_deref().map(str::trim).and_then(|p| p.chars().next()) {
        Some(c) => Some(proposed.with_promotion(Role::from_char(c.to_ascii_lowercase())?)),
        None => Some(proposed),
    }
}
