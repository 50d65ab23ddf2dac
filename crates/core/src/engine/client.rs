//! Streaming UCI engine client
//!
//! Owns one engine process and at most one active search. Commands go out
//! through an ordered channel drained by a writer task; a reader task parses
//! the engine's output and forwards evaluations to subscribers.
//!
//! UCI output carries no request ids, so every search is given a generation
//! number and queued. `info` lines belong to the oldest unfinished search and
//! `bestmove` finishes it. Only output of the current generation is
//! delivered; the check happens under the same lock that bumps the
//! generation.

use shakmaty::fen::Fen;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::analysis::{self, EngineOutput, EvaluationResult};
use super::launcher::EngineLauncher;
use super::EngineError;

pub const DEFAULT_DEPTH: u8 = 20;
pub const MAX_DEPTH: u8 = 30;

/// Something the engine reported for a given analysis generation
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub generation: u64,
    pub kind: EngineEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    Evaluation(EvaluationResult),
    SearchComplete { best_move: Option<String> },
}

#[derive(Default)]
struct Shared {
    generation: u64,
    /// Bumped per started process; output from older readers is ignored
    epoch: u64,
    searches: VecDeque<u64>,
    subscribers: Vec<mpsc::UnboundedSender<EngineEvent>>,
}

impl Shared {
    fn dispatch(&mut self, epoch: u64, output: EngineOutput) {
        if epoch != self.epoch {
            return;
        }

        let (search, kind) = match output {
            EngineOutput::Info(result) => (self.searches.front().copied(), EngineEventKind::Evaluation(result)),
            EngineOutput::BestMove(best_move) => {
                (self.searches.pop_front(), EngineEventKind::SearchComplete { best_move })
            }
        };

        let Some(generation) = search else {
            tracing::trace!("engine output outside of any search");
            return;
        };
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "dropping stale engine output");
            return;
        }

        let event = EngineEvent { generation, kind };
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    commands: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
    child: Option<Child>,
}

impl Worker {
    fn is_alive(&self) -> bool {
        !self.commands.is_closed() && !self.reader.is_finished()
    }

    fn shutdown(mut self) {
        self.writer.abort();
        self.reader.abort();
        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "engine process already gone");
            }
        }
    }
}

pub struct EngineClient {
    launcher: Box<dyn EngineLauncher>,
    depth: u8,
    shared: Arc<Mutex<Shared>>,
    worker: Option<Worker>,
}

impl EngineClient {
    /// Creates a client. The engine itself is started by the first
    /// [`analyze`](Self::analyze).
    pub fn new<L: EngineLauncher + 'static>(launcher: L) -> Self {
        Self {
            launcher: Box::new(launcher),
            depth: DEFAULT_DEPTH,
            shared: Arc::new(Mutex::new(Shared::default())),
            worker: None,
        }
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.set_depth(depth);
        self
    }

    /// Registers a listener. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.shared).subscribers.push(tx);
        rx
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Target depth for the next search; an in-flight search keeps its own.
    pub fn set_depth(&mut self, depth: u8) {
        self.depth = depth.clamp(1, MAX_DEPTH);
    }

    /// Generation of the most recent analyze/stop/destroy
    pub fn generation(&self) -> u64 {
        lock(&self.shared).generation
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(Worker::is_alive)
    }

    /// Stops any running search and starts a new one on `fen`.
    ///
    /// A given `depth` also becomes the target for later searches. Returns
    /// the generation the results will carry, or `None` if the engine could
    /// not be started (the next call tries again). Must be called from
    /// within a Tokio runtime.
    pub fn analyze(&mut self, fen: &Fen, depth: Option<u8>) -> Option<u64> {
        if let Some(depth) = depth {
            self.set_depth(depth);
        }
        if !self.ensure_worker() {
            return None;
        }

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            let generation = shared.generation;
            shared.searches.push_back(generation);
            generation
        };

        let sent = self.send("stop")
            && self.send(format!("position fen {}", fen))
            && self.send(format!("go depth {}", self.depth));
        if !sent {
            tracing::warn!("engine stopped accepting commands, it will be restarted");
            self.discard_worker();
            return None;
        }

        tracing::debug!(generation, depth = self.depth, fen = %fen, "analysis started");
        Some(generation)
    }

    /// Cancels the running search. Anything it still reports is discarded.
    pub fn stop(&mut self) {
        lock(&self.shared).generation += 1;
        if self.worker.is_some() {
            self.send("stop");
        }
    }

    /// Terminates the engine. A later [`analyze`](Self::analyze) starts a
    /// fresh process.
    pub fn destroy(&mut self) {
        {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.searches.clear();
        }
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
            tracing::info!("engine terminated");
        }
    }

    fn send(&self, command: impl Into<String>) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.commands.send(command.into()).is_ok())
    }

    fn ensure_worker(&mut self) -> bool {
        if self.is_running() {
            return true;
        }
        if self.worker.is_some() {
            tracing::warn!("engine exited, restarting");
            self.discard_worker();
        }

        match self.start_worker() {
            Ok(worker) => {
                self.worker = Some(worker);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start engine, will retry on next analysis");
                false
            }
        }
    }

    fn start_worker(&self) -> Result<Worker, EngineError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let io = self.launcher.launch()?;

        let epoch = {
            let mut shared = lock(&self.shared);
            shared.epoch += 1;
            shared.searches.clear();
            shared.epoch
        };

        let (commands, rx) = mpsc::unbounded_channel();
        let writer = runtime.spawn(write_commands(io.stdin, rx));
        let reader = runtime.spawn(read_output(io.stdout, Arc::clone(&self.shared), epoch));

        // Handshake; replies are not awaited
        let _ = commands.send("uci".to_string());
        let _ = commands.send("isready".to_string());

        Ok(Worker {
            commands,
            writer,
            reader,
            child: io.child,
        })
    }

    fn discard_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
        lock(&self.shared).searches.clear();
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn write_commands<W>(mut stdin: W, mut commands: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = commands.recv().await {
        tracing::trace!(command = %command, "engine <<");
        if let Err(e) = write_line(&mut stdin, &command).await {
            tracing::warn!(error = %e, "failed to write to engine");
            break;
        }
    }
}

async fn write_line<W>(stdin: &mut W, command: &str) -> Result<(), EngineError>
where
    W: AsyncWrite + Unpin,
{
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

async fn read_output<R>(stdout: R, shared: Arc<Mutex<Shared>>, epoch: u64)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracing::trace!(line = %line, "engine >>");
                if let Some(output) = analysis::parse_line(&line) {
                    lock(&shared).dispatch(epoch, output);
                }
            }
            Ok(None) => {
                tracing::debug!("engine output closed");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read engine output");
                break;
            }
        }
    }
}
