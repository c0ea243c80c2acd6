//! Background execution of one command with a one-shot result hand-off.
//!
//! A worker owns a dedicated thread for a single request. When the command
//! finishes the worker sends exactly one `WorkerEvent` back to the thread
//! that owns the receiver; it never touches caller state directly. A
//! cancelled worker sends `Stopped` and nothing after it.

use std::fmt;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::LaunchError;
use crate::ports::runner::{CancelToken, CommandResult, CommandRunner, RunError};
use crate::request::{CommandRequest, Intent};

/// Names one worker invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    /// A fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Message a worker sends when it is done.
#[derive(Debug)]
pub enum WorkerEvent {
    /// The process exited, or never started.
    Completed {
        /// Invocation this result belongs to.
        id: OperationId,
        /// Intent of the request that ran.
        intent: Intent,
        /// Captured output, or why the program could not be started.
        result: Result<CommandResult, LaunchError>,
    },
    /// The run was cancelled and the process killed.
    Stopped {
        /// Invocation that was stopped.
        id: OperationId,
        /// Intent of the request that was stopped.
        intent: Intent,
    },
}

impl WorkerEvent {
    /// Invocation this event belongs to.
    #[must_use]
    pub fn id(&self) -> OperationId {
        match self {
            Self::Completed { id, .. } | Self::Stopped { id, .. } => *id,
        }
    }
}

/// Caller-side handle to a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    id: OperationId,
    intent: Intent,
    cancel: CancelToken,
}

impl WorkerHandle {
    /// Invocation id.
    #[must_use]
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Intent of the running request.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Asks the worker to kill its process. Best-effort and idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Runs `request` on a new thread and reports back through `events`.
pub fn spawn<E>(
    runner: Arc<dyn CommandRunner>,
    request: CommandRequest,
    events: &Sender<E>,
) -> WorkerHandle
where
    E: From<WorkerEvent> + Send + 'static,
{
    let id = OperationId::new();
    let intent = request.intent();
    let cancel = CancelToken::new();
    let handle = WorkerHandle { id, intent, cancel: cancel.clone() };

    let tx = events.clone();
    let spawned = thread::Builder::new().name(format!("winnmt-worker-{id}")).spawn(move || {
        debug!(%id, command = %request, "worker started");
        let event = match runner.run(&request, &cancel) {
            Ok(result) => {
                info!(%id, exit_code = result.exit_code, "command finished");
                WorkerEvent::Completed { id, intent, result: Ok(result) }
            }
            Err(RunError::Launch(err)) => {
                warn!(%id, error = %err, "command could not be started");
                WorkerEvent::Completed { id, intent, result: Err(err) }
            }
            Err(RunError::Cancelled) => {
                info!(%id, "command stopped");
                WorkerEvent::Stopped { id, intent }
            }
        };
        // The receiver may be gone if the caller shut down first.
        let _ = tx.send(event.into());
    });

    if let Err(err) = spawned {
        let failure = LaunchError::new("worker thread", io::Error::other(err.to_string()));
        let _ = events.send(WorkerEvent::Completed { id, intent, result: Err(failure) }.into());
    }
    handle
}
