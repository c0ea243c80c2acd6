//! Transcripts of host traffic for record and replay.
//!
//! A transcript captures what the command runner and inventory were asked
//! and what the host answered, so the exact output of a real (possibly
//! non-English) Windows machine can be replayed elsewhere.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Exchange, Transcript};
pub use recorder::TranscriptRecorder;
pub use replayer::TranscriptReplayer;
