//! Command runner port for executing external administrative commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LaunchError;
use crate::request::CommandRequest;

/// Captured result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Standard output followed by standard error.
    pub output: String,
    /// Process exit code, `-1` if the process ended without one.
    pub exit_code: i32,
}

impl CommandResult {
    /// `true` when the exit code is 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Shared flag asking an in-flight command to be killed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a run produced no `CommandResult`.
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// The run was cancelled and the process killed.
    #[error("command was cancelled")]
    Cancelled,
}

/// Runs external commands.
///
/// Implementations are stateless with respect to callers and may be invoked
/// from several threads at once.
pub trait CommandRunner: Send + Sync {
    /// Runs `request` to completion, or until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Launch` if the program cannot be started and
    /// `RunError::Cancelled` if the token fired before the process exited.
    fn run(&self, request: &CommandRequest, cancel: &CancelToken) -> Result<CommandResult, RunError>;
}
