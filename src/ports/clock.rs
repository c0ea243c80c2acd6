//! Clock port for timestamping log entries.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Substituted with a fixed clock in tests so log entries are predictable.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
