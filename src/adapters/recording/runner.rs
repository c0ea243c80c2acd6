//! Recording adapter for the `CommandRunner` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::ports::runner::{CancelToken, CommandResult, CommandRunner, RunError};
use crate::request::CommandRequest;
use crate::transcript::TranscriptRecorder;

/// Records every run while delegating to an inner runner.
pub struct RecordingCommandRunner {
    inner: Arc<dyn CommandRunner>,
    recorder: Arc<Mutex<TranscriptRecorder>>,
}

impl RecordingCommandRunner {
    /// Wraps `inner`, appending to `recorder`.
    pub fn new(inner: Arc<dyn CommandRunner>, recorder: Arc<Mutex<TranscriptRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, request: &CommandRequest, cancel: &CancelToken) -> Result<CommandResult, RunError> {
        let result = self.inner.run(request, cancel);
        if matches!(result, Err(RunError::Cancelled)) {
            let mut guard = self.recorder.lock().expect("recorder lock poisoned");
            guard.record("runner", "run", request, &serde_json::json!({ "Cancelled": true }));
        } else {
            record_result(&self.recorder, "runner", "run", request, &result);
        }
        result
    }
}
