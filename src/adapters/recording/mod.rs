//! Recording adapters that capture host traffic into a transcript.

pub mod inventory;
pub mod runner;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::transcript::TranscriptRecorder;

pub use inventory::RecordingInventory;
pub use runner::RecordingCommandRunner;

/// Records a `Result` as `{"Ok": value}` or `{"Err": message}`.
pub(crate) fn record_result<Q, T, E>(
    recorder: &Arc<Mutex<TranscriptRecorder>>,
    port: &str,
    call: &str,
    request: &Q,
    result: &Result<T, E>,
) where
    Q: Serialize + ?Sized,
    T: Serialize,
    E: std::fmt::Display,
{
    let response = match result {
        Ok(value) => serde_json::json!({ "Ok": value }),
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };
    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, call, request, &response);
}
