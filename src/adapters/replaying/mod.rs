//! Replaying adapters that answer from a recorded transcript.

pub mod inventory;
pub mod runner;

use std::sync::Mutex;

use crate::transcript::TranscriptReplayer;

pub use inventory::ReplayingInventory;
pub use runner::ReplayingCommandRunner;

/// Takes the next response for `port`/`call` from a shared replayer.
pub(crate) fn next_response(
    replayer: &Mutex<TranscriptReplayer>,
    port: &str,
    call: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next(port, call).map(|exchange| exchange.response)
}

/// Splits a recorded `{"Ok": v}` / `{"Err": msg}` response.
pub(crate) fn split_result(response: serde_json::Value) -> Result<serde_json::Value, String> {
    match response {
        serde_json::Value::Object(mut map) => {
            if let Some(value) = map.remove("Ok") {
                Ok(value)
            } else if let Some(err) = map.remove("Err") {
                Err(err.as_str().unwrap_or("unknown error").to_string())
            } else {
                Err("recorded response has neither Ok nor Err".to_string())
            }
        }
        other => Err(format!("unexpected recorded response: {other}")),
    }
}
