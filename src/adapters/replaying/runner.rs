//! Replaying adapter for the `CommandRunner` port.

use std::io;
use std::sync::Mutex;

use super::{next_response, split_result};
use crate::error::LaunchError;
use crate::ports::runner::{CancelToken, CommandResult, CommandRunner, RunError};
use crate::request::CommandRequest;
use crate::transcript::TranscriptReplayer;

/// Answers runs with recorded results, in order.
pub struct ReplayingCommandRunner {
    replayer: Mutex<TranscriptReplayer>,
}

impl ReplayingCommandRunner {
    /// Creates a runner over `replayer`.
    #[must_use]
    pub fn new(replayer: TranscriptReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl CommandRunner for ReplayingCommandRunner {
    fn run(&self, request: &CommandRequest, _cancel: &CancelToken) -> Result<CommandResult, RunError> {
        let launch = |message: String| -> RunError {
            LaunchError::new(request.program(), io::Error::other(message)).into()
        };
        let response = next_response(&self.replayer, "runner", "run").map_err(launch)?;
        if response.get("Cancelled").is_some() {
            return Err(RunError::Cancelled);
        }
        let value = split_result(response).map_err(launch)?;
        serde_json::from_value(value).map_err(|e| launch(format!("bad recorded result: {e}")))
    }
}
