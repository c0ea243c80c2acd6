//! Inventory Reader: current shares, mapped drives and free drive letters,
//! plus synchronous removal of either.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{InventoryError, ValidationError};
use crate::ports::drives::DriveProbe;
use crate::ports::inventory::{Inventory, MappedDriveRecord, ShareRecord};
use crate::ports::runner::{CancelToken, CommandRunner, RunError};
use crate::request::CommandRequest;

/// Administrative pipe share that is never shown.
pub const IPC_SHARE: &str = "IPC$";

/// Result of a removal command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The command exited with status 0.
    Removed,
    /// The command failed; carries the OS-provided text.
    RemovalFailed(String),
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removed => f.write_str("removed"),
            Self::RemovalFailed(message) => write!(f, "removal failed: {message}"),
        }
    }
}

/// Reads and edits the host's share and connection tables.
pub struct InventoryReader<'a> {
    inventory: &'a dyn Inventory,
    runner: &'a dyn CommandRunner,
}

impl<'a> InventoryReader<'a> {
    /// Binds the reader to a query port and a runner for removals.
    #[must_use]
    pub fn new(inventory: &'a dyn Inventory, runner: &'a dyn CommandRunner) -> Self {
        Self { inventory, runner }
    }

    /// Current shares, without `IPC$`.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::QueryFailed` if the share enumeration fails.
    pub fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError> {
        let mut shares = self.inventory.list_shares()?;
        shares.retain(|share| !share.name.eq_ignore_ascii_case(IPC_SHARE));
        debug!(count = shares.len(), "listed shares");
        Ok(shares)
    }

    /// Current network connections.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::QueryFailed` if the connection enumeration fails.
    pub fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError> {
        let drives = self.inventory.list_mapped_drives()?;
        debug!(count = drives.len(), "listed mapped drives");
        Ok(drives)
    }

    /// Drive letters that are neither mapped nor backed by a local volume.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::QueryFailed` if the connection enumeration fails.
    pub fn available_drive_letters(
        &self,
        probe: &dyn DriveProbe,
    ) -> Result<Vec<String>, InventoryError> {
        let mapped = self.list_mapped_drives()?;
        Ok(free_drive_letters(probe, &mapped))
    }

    /// Runs `net share <name> /delete`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank name.
    pub fn remove_share(&self, name: &str) -> Result<Removal, ValidationError> {
        Ok(self.remove(&CommandRequest::unshare_folder(name)?))
    }

    /// Runs `net use <local_name> /delete`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank name.
    pub fn remove_mapped_drive(&self, local_name: &str) -> Result<Removal, ValidationError> {
        Ok(self.remove(&CommandRequest::unmap_drive(local_name)?))
    }

    fn remove(&self, request: &CommandRequest) -> Removal {
        match self.runner.run(request, &CancelToken::new()) {
            Ok(result) if result.success() => Removal::Removed,
            Ok(result) => {
                let message = result.output.trim().to_string();
                warn!(command = %request, exit_code = result.exit_code, "removal failed");
                Removal::RemovalFailed(message)
            }
            Err(RunError::Launch(err)) => Removal::RemovalFailed(err.to_string()),
            Err(RunError::Cancelled) => Removal::RemovalFailed("cancelled".into()),
        }
    }
}

/// Drive letters that are neither in `mapped` nor backed by a local volume.
#[must_use]
pub fn free_drive_letters(probe: &dyn DriveProbe, mapped: &[MappedDriveRecord]) -> Vec<String> {
    ('A'..='Z')
        .filter(|letter| !probe.is_present(*letter))
        .map(|letter| format!("{letter}:"))
        .filter(|drive| !mapped.iter().any(|m| m.local_name.eq_ignore_ascii_case(drive)))
        .collect()
}
