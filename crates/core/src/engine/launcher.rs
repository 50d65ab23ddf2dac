//! Starting the engine process

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};

use super::EngineError;

/// Pipes to a freshly started engine
pub struct EngineIo {
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    /// The process, when there is one to kill on shutdown
    pub child: Option<Child>,
}

/// Starts engines on demand. Called from within a Tokio runtime.
pub trait EngineLauncher: Send + Sync {
    fn launch(&self) -> Result<EngineIo, EngineError>;
}

/// Spawns a UCI binary such as Stockfish
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    path: PathBuf,
}

impl ProcessLauncher {
    /// # Arguments
    /// * `path` - Path to the engine binary (or "stockfish" if in PATH)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EngineLauncher for ProcessLauncher {
    fn launch(&self) -> Result<EngineIo, EngineError> {
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", self.path.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdin".into()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdout".into()))?;

        tracing::info!(path = %self.path.display(), pid = ?child.id(), "engine process started");

        Ok(EngineIo {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            child: Some(child),
        })
    }
}
