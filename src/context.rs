//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::{LiveClock, LiveCommandRunner, LiveDriveProbe, LiveInventory};
use crate::adapters::recording::{RecordingCommandRunner, RecordingInventory};
use crate::adapters::replaying::{ReplayingCommandRunner, ReplayingInventory};
use crate::adapters::simulated::SimulatedHost;
use crate::config::HostMode;
use crate::ports::{Clock, CommandRunner, DriveProbe, Inventory};
use crate::transcript::{Transcript, TranscriptRecorder, TranscriptReplayer};

/// Bundles the host boundaries a session talks to.
///
/// Constructors wire up different adapters (live, recording, replaying,
/// simulated).
pub struct ServiceContext {
    /// Runs commands; shared with worker threads.
    pub runner: Arc<dyn CommandRunner>,
    /// Share and connection tables.
    pub inventory: Box<dyn Inventory>,
    /// Local volume probe.
    pub drives: Box<dyn DriveProbe>,
    /// Clock for log timestamps.
    pub clock: Box<dyn Clock>,
    /// Transcript written when the context is dropped.
    recorder: Option<Arc<Mutex<TranscriptRecorder>>>,
}

impl ServiceContext {
    /// Builds the context for `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay transcript cannot be loaded.
    pub fn for_mode(mode: &HostMode) -> Result<Self, String> {
        match mode {
            HostMode::Live => Ok(Self::live()),
            HostMode::Record(path) => Ok(Self::recording(path)),
            HostMode::Replay(path) => Self::replaying(path),
            HostMode::Simulated => Ok(Self::simulated(SimulatedHost::new())),
        }
    }

    /// Real process spawning and Win32 queries.
    #[must_use]
    pub fn live() -> Self {
        Self {
            runner: Arc::new(LiveCommandRunner::new()),
            inventory: Box::new(LiveInventory),
            drives: Box::new(LiveDriveProbe),
            clock: Box::new(LiveClock),
            recorder: None,
        }
    }

    /// Live adapters whose traffic is written to `path` on drop.
    #[must_use]
    pub fn recording(path: &Path) -> Self {
        Self::recording_over(
            Arc::new(LiveCommandRunner::new()),
            Box::new(LiveInventory),
            Box::new(LiveDriveProbe),
            path,
        )
    }

    /// Wraps `runner` and `inventory` so their traffic is written to `path`
    /// on drop. The drive probe is not recorded.
    #[must_use]
    pub fn recording_over(
        runner: Arc<dyn CommandRunner>,
        inventory: Box<dyn Inventory>,
        drives: Box<dyn DriveProbe>,
        path: &Path,
    ) -> Self {
        let recorder = Arc::new(Mutex::new(TranscriptRecorder::new(path, "winnmt-session")));
        Self {
            runner: Arc::new(RecordingCommandRunner::new(runner, Arc::clone(&recorder))),
            inventory: Box::new(RecordingInventory::new(inventory, Arc::clone(&recorder))),
            drives,
            clock: Box::new(LiveClock),
            recorder: Some(recorder),
        }
    }

    /// Runner and inventory answered from a transcript file.
    ///
    /// Each port gets its own replayer so their cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the transcript cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let transcript = Transcript::load(path)?;
        Ok(Self {
            runner: Arc::new(ReplayingCommandRunner::new(TranscriptReplayer::new(&transcript))),
            inventory: Box::new(ReplayingInventory::new(TranscriptReplayer::new(&transcript))),
            drives: Box::new(LiveDriveProbe),
            clock: Box::new(LiveClock),
            recorder: None,
        })
    }

    /// Every port served by one simulated host.
    #[must_use]
    pub fn simulated(host: SimulatedHost) -> Self {
        Self {
            runner: Arc::new(host.clone()),
            inventory: Box::new(host.clone()),
            drives: Box::new(host),
            clock: Box::new(LiveClock),
            recorder: None,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let saved = recorder
                .lock()
                .map_err(|e| std::io::Error::other(e.to_string()))
                .and_then(|guard| guard.save());
            match saved {
                Ok(path) => eprintln!("Transcript saved to: {}", path.display()),
                Err(e) => eprintln!("Warning: failed to write transcript: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::runner::CancelToken;
    use crate::request::{CommandOptions, CommandRequest};
    use crate::transcript::Exchange;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn simulated_ports_share_one_host() {
        let ctx = ServiceContext::simulated(SimulatedHost::new());
        let req =
            CommandRequest::map_drive("10.0.0.5", "public", "Z:", &CommandOptions::default())
                .unwrap();
        ctx.runner.run(&req, &CancelToken::new()).unwrap();
        let drives = ctx.inventory.list_mapped_drives().unwrap();
        assert_eq!(drives[0].local_name, "Z:");
        assert!(ctx.drives.is_present('C'));
    }

    #[test]
    fn replaying_context_serves_transcript() {
        let dir = std::env::temp_dir().join("winnmt_ctx_replay_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("host.transcript.yaml");
        let transcript = Transcript {
            name: "t".into(),
            recorded_at: Utc::now(),
            host: "WS01".into(),
            exchanges: vec![Exchange {
                seq: 0,
                port: "inventory".into(),
                call: "list_shares".into(),
                request: json!(null),
                response: json!({"Ok": [{"name": "public", "local_path": "C:\\public"}]}),
            }],
        };
        std::fs::write(&path, serde_yaml::to_string(&transcript).unwrap()).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        let shares = ctx.inventory.list_shares().unwrap();
        assert_eq!(shares[0].name, "public");
        assert!(ctx.inventory.list_shares().is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_missing_transcript_fails() {
        let mode = HostMode::Replay("/nonexistent/winnmt.yaml".into());
        assert!(ServiceContext::for_mode(&mode).is_err());
    }
}
