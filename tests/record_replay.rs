//! Record-replay round-trip integration test.
//!
//! 1. Drive a session against a German-language simulated host while
//!    recording every runner and inventory exchange.
//! 2. Replay the transcript with `ServiceContext::replaying()` and run the
//!    same operations.
//! 3. Assert identical log messages and tables, twice over.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use winnmt::adapters::simulated::{Locale, SimulatedHost};
use winnmt::config::Settings;
use winnmt::context::ServiceContext;
use winnmt::ports::inventory::{MappedDriveRecord, ShareRecord};
use winnmt::session::Session;

const WAIT: Option<Duration> = Some(Duration::from_secs(5));

type Snapshot = (Vec<String>, Vec<ShareRecord>, Vec<MappedDriveRecord>);

/// Maps, shares and unmaps, returning what the operator would have seen.
fn exercise(ctx: ServiceContext) -> Snapshot {
    let mut session = Session::new(ctx, Settings::default());
    session.refresh();

    let id = session.map_drive("10.0.0.5", "public", "Z:").unwrap();
    session.wait_for(id, WAIT).unwrap();
    let id = session.share_folder(r"C:\data").unwrap();
    session.wait_for(id, WAIT).unwrap();
    let _ = session.unmap("Q:").unwrap();

    let messages = session.log().iter().map(|e| e.message.clone()).collect();
    (messages, session.shares().to_vec(), session.mapped_drives().to_vec())
}

fn record(path: &Path) -> Snapshot {
    let host = SimulatedHost::new().with_locale(Locale::German);
    let ctx = ServiceContext::recording_over(
        Arc::new(host.clone()),
        Box::new(host.clone()),
        Box::new(host),
        path,
    );
    // The transcript is written when the session and its context drop.
    exercise(ctx)
}

#[test]
fn record_then_replay_produces_identical_outputs() {
    let dir = std::env::temp_dir().join("winnmt_record_replay_test");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("de-host.transcript.yaml");

    // --- Phase 1: record against the simulated host ---
    let recorded = record(&path);
    assert!(path.exists(), "transcript should be written on drop");
    assert_eq!(
        recorded.0[..4],
        [
            "Mapping network drive...",
            "Network drive mapped successfully.",
            "Sharing folder...",
            "Folder created and shared successfully.",
        ]
    );
    assert!(recorded.0[4].starts_with("Failed to disconnect Q:"));
    assert!(recorded.1.iter().any(|s| s.name == "data"));
    assert_eq!(recorded.2[0].remote_name, r"\\10.0.0.5\public");

    // --- Phase 2: replay and compare ---
    let first = exercise(ServiceContext::replaying(&path).unwrap());
    assert_eq!(first, recorded, "replay differs from recording");

    // --- Phase 3: replay again for determinism ---
    let second = exercise(ServiceContext::replaying(&path).unwrap());
    assert_eq!(first, second, "replays differ");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exhausted_transcript_surfaces_as_launch_failure() {
    let dir = std::env::temp_dir().join("winnmt_record_replay_exhausted");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("empty.transcript.yaml");
    {
        let host = SimulatedHost::new();
        let ctx = ServiceContext::recording_over(
            Arc::new(host.clone()),
            Box::new(host.clone()),
            Box::new(host),
            &path,
        );
        drop(ctx);
    }

    let mut session = Session::new(ServiceContext::replaying(&path).unwrap(), Settings::default());
    let id = session.map_drive("10.0.0.5", "public", "Z:").unwrap();
    let report = session.wait_for(id, WAIT).unwrap();
    assert!(report.result.is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
