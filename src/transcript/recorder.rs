//! Accumulates exchanges and writes them as a YAML transcript.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use super::format::{host_name, Exchange, Transcript};

/// Collects exchanges for one session.
#[derive(Debug)]
pub struct TranscriptRecorder {
    path: PathBuf,
    name: String,
    exchanges: Vec<Exchange>,
}

impl TranscriptRecorder {
    /// Creates a recorder that will write to `path`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), exchanges: Vec::new() }
    }

    /// Appends an exchange. Sequence numbers are assigned in call order.
    pub fn record<Q, R>(&mut self, port: &str, call: &str, request: &Q, response: &R)
    where
        Q: Serialize + ?Sized,
        R: Serialize + ?Sized,
    {
        let seq = self.exchanges.len() as u64;
        self.exchanges.push(Exchange {
            seq,
            port: port.to_string(),
            call: call.to_string(),
            request: serde_json::to_value(request).unwrap_or_default(),
            response: serde_json::to_value(response).unwrap_or_default(),
        });
    }

    /// Number of exchanges recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Writes everything recorded so far. May be called more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let transcript = Transcript {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            host: host_name(),
            exchanges: self.exchanges.clone(),
        };
        let yaml = serde_yaml::to_string(&transcript).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_writes_numbered_exchanges() {
        let dir = std::env::temp_dir().join("winnmt_transcript_recorder_test");
        let path = dir.join("session.transcript.yaml");

        let mut recorder = TranscriptRecorder::new(&path, "recorder-test");
        assert!(recorder.is_empty());
        recorder.record("runner", "run", &json!({"program": "net"}), &json!({"Ok": 1}));
        recorder.record("inventory", "list_shares", &(), &json!({"Ok": []}));
        assert_eq!(recorder.len(), 2);

        let written = recorder.save().unwrap();
        assert_eq!(written, path);
        let transcript = Transcript::load(&path).unwrap();
        assert_eq!(transcript.name, "recorder-test");
        assert_eq!(transcript.exchanges[1].seq, 1);
        assert_eq!(transcript.exchanges[1].call, "list_shares");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
