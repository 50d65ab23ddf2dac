//! A game under review: navigation, live analysis and move annotations
//!
//! Every cursor change stops the running search and starts one for the new
//! position. Evaluations are cached per cursor (white's point of view) so a
//! move can be scored once both the position before it and the position
//! after it have been evaluated.

use shakmaty::Square;
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::config::ReviewConfig;
use crate::engine::{EngineClient, EngineEvent, EngineEventKind, EvaluationResult, ProcessLauncher};
use crate::game::GameRecord;
use crate::navigator::{Navigator, UserMove};
use crate::quality::{self, MoveScorer, ScoreContext};
use crate::replay::BoardPosition;

#[derive(Debug, Clone, Copy)]
struct PendingAnnotation {
    cursor: usize,
    square: Square,
}

#[derive(Debug, Clone, Copy)]
struct Analysis {
    generation: u64,
    cursor: usize,
}

pub struct ReviewSession {
    navigator: Navigator,
    engine: EngineClient,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    scorer: Box<dyn MoveScorer>,
    evaluation: Option<EvaluationResult>,
    best_move: Option<String>,
    /// White-perspective scores by cursor, for the selected game
    scores: HashMap<usize, f64>,
    pending: Option<PendingAnnotation>,
    analysis: Option<Analysis>,
}

impl ReviewSession {
    /// Session backed by the configured engine binary. The engine starts
    /// with the first analysis.
    pub fn new(config: &ReviewConfig) -> Self {
        let engine = EngineClient::new(ProcessLauncher::new(config.engine_path.clone())).with_depth(config.engine_depth);
        Self::with_engine(engine, Navigator::new(config.user_moves), config.scorer.build())
    }

    pub fn with_engine(engine: EngineClient, navigator: Navigator, scorer: Box<dyn MoveScorer>) -> Self {
        let events = engine.subscribe();
        Self {
            navigator,
            engine,
            events,
            scorer,
            evaluation: None,
            best_move: None,
            scores: HashMap::new(),
            pending: None,
            analysis: None,
        }
    }

    pub fn select_game(&mut self, record: &GameRecord) {
        self.navigator.select_game(record);
        self.scores.clear();
        self.sync();
    }

    pub fn go_first(&mut self) -> bool {
        let moved = self.navigator.go_first();
        self.sync();
        moved
    }

    pub fn go_prev(&mut self) -> bool {
        let moved = self.navigator.go_prev();
        self.sync();
        moved
    }

    pub fn go_next(&mut self) -> bool {
        let moved = self.navigator.go_next();
        self.sync();
        moved
    }

    pub fn go_last(&mut self) -> bool {
        let moved = self.navigator.go_last();
        self.sync();
        moved
    }

    pub fn apply_user_move(&mut self, proposed: UserMove) -> bool {
        let moved = self.navigator.apply_user_move(proposed);
        self.sync();
        moved
    }

    /// Changes the search depth and re-analyzes the current position.
    pub fn set_depth(&mut self, depth: u8) {
        self.engine.set_depth(depth);
        if self.navigator.record().is_some() {
            self.evaluation = None;
            self.best_move = None;
            self.analyze();
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop();
        self.analysis = None;
    }

    pub fn destroy(&mut self) {
        self.engine.destroy();
        self.analysis = None;
    }

    /// Applies every event received so far without waiting. Returns how
    /// many belonged to the current analysis.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.apply(&event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next event of the current analysis and applies it.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        loop {
            let event = self.events.recv().await?;
            if self.apply(&event) {
                return Some(event);
            }
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn position(&self) -> BoardPosition {
        self.navigator.position()
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    pub fn best_move(&self) -> Option<&str> {
        self.best_move.as_deref()
    }

    pub fn depth(&self) -> u8 {
        self.engine.depth()
    }

    /// White-perspective score recorded for a cursor of the selected game
    pub fn score_at(&self, cursor: usize) -> Option<f64> {
        self.scores.get(&cursor).copied()
    }

    fn sync(&mut self) {
        let Some(cursor) = self.navigator.refresh() else {
            return;
        };

        self.evaluation = None;
        self.best_move = None;
        self.pending = self
            .navigator
            .last_move()
            .filter(|_| cursor > 0)
            .map(|last| PendingAnnotation {
                cursor,
                square: last.to,
            });
        self.try_annotate();
        self.analyze();
    }

    fn analyze(&mut self) {
        let cursor = self.navigator.cursor();
        let fen = self.navigator.position().fen();
        self.analysis = self
            .engine
            .analyze(&fen, None)
            .map(|generation| Analysis { generation, cursor });
    }

    fn try_annotate(&mut self) {
        let Some(pending) = self.pending else {
            return;
        };

        let context = ScoreContext::new(
            pending.cursor,
            self.score_at(pending.cursor - 1),
            self.score_at(pending.cursor),
        );
        if let Some(score) = self.scorer.score(&context) {
            let label = quality::classify(score);
            tracing::debug!(cursor = pending.cursor, square = %pending.square, score, quality = label.as_str(), "move annotated");
            self.navigator.annotate(pending.square, label);
            self.pending = None;
        }
    }

    fn apply(&mut self, event: &EngineEvent) -> bool {
        let Some(analysis) = self.analysis.filter(|a| a.generation == event.generation) else {
            tracing::trace!(generation = event.generation, "ignoring event of a superseded analysis");
            return false;
        };

        match &event.kind {
            EngineEventKind::Evaluation(result) => {
                // Engine scores are from the side to move; even cursors have white to move
                let white_score = if analysis.cursor % 2 == 0 {
                    result.score
                } else {
                    -result.score
                };
                self.scores.insert(analysis.cursor, white_score);
                self.evaluation = Some(result.clone());
            }
            EngineEventKind::SearchComplete { best_move } => {
                self.best_move = best_move.clone();
                self.try_annotate();
                self.pending = None;
            }
        }
        true
    }
}
