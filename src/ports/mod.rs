//! Port traits defining external boundaries.
//!
//! Each trait is a boundary between the application core and the host
//! (process spawning, the share and connection tables, local volumes, time).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod drives;
pub mod inventory;
pub mod runner;

pub use clock::Clock;
pub use drives::DriveProbe;
pub use inventory::{Inventory, MappedDriveRecord, ShareRecord};
pub use runner::{CancelToken, CommandResult, CommandRunner, RunError};
