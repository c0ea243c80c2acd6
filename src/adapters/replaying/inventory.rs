//! Replaying adapter for the `Inventory` port.

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use super::{next_response, split_result};
use crate::error::InventoryError;
use crate::ports::inventory::{Inventory, MappedDriveRecord, ShareRecord};
use crate::transcript::TranscriptReplayer;

/// Answers queries with recorded tables, in order.
pub struct ReplayingInventory {
    replayer: Mutex<TranscriptReplayer>,
}

impl ReplayingInventory {
    /// Creates an inventory over `replayer`.
    #[must_use]
    pub fn new(replayer: TranscriptReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: DeserializeOwned>(
        &self,
        call: &'static str,
        os_call: &'static str,
    ) -> Result<T, InventoryError> {
        let failed = |detail: String| InventoryError::QueryFailed { call: os_call, detail };
        let response = next_response(&self.replayer, "inventory", call).map_err(failed)?;
        let value = split_result(response).map_err(failed)?;
        serde_json::from_value(value).map_err(|e| failed(e.to_string()))
    }
}

impl Inventory for ReplayingInventory {
    fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError> {
        self.replay("list_shares", "NetShareEnum")
    }

    fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError> {
        self.replay("list_mapped_drives", "NetUseEnum")
    }
}
