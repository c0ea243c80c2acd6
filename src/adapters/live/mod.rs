//! Live adapters talking to the real host.

pub mod clock;
pub mod drives;
pub mod inventory;
pub mod runner;

pub use clock::LiveClock;
pub use drives::LiveDriveProbe;
pub use inventory::LiveInventory;
pub use runner::LiveCommandRunner;
