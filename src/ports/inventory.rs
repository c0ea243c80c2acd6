//! Inventory port for querying the live share and connection tables.

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// A folder published over SMB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Published share name.
    pub name: String,
    /// Local folder behind the share.
    pub local_path: String,
}

/// A local device name bound to a remote share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedDriveRecord {
    /// Drive letter such as `Z:`, or empty for deviceless connections.
    pub local_name: String,
    /// UNC path of the remote share.
    pub remote_name: String,
}

/// Reads the host's share and connection tables.
///
/// Every call re-queries the OS; nothing is cached.
pub trait Inventory: Send + Sync {
    /// Lists every share on the local machine, including administrative ones.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::QueryFailed` if the enumeration call fails.
    fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError>;

    /// Lists the current user's network connections.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::QueryFailed` if the enumeration call fails.
    fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError>;
}
