//! Recording adapter for the `Inventory` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::error::InventoryError;
use crate::ports::inventory::{Inventory, MappedDriveRecord, ShareRecord};
use crate::transcript::TranscriptRecorder;

/// Records every query while delegating to an inner inventory.
pub struct RecordingInventory {
    inner: Box<dyn Inventory>,
    recorder: Arc<Mutex<TranscriptRecorder>>,
}

impl RecordingInventory {
    /// Wraps `inner`, appending to `recorder`.
    pub fn new(inner: Box<dyn Inventory>, recorder: Arc<Mutex<TranscriptRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl Inventory for RecordingInventory {
    fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError> {
        let result = self.inner.list_shares();
        record_result(&self.recorder, "inventory", "list_shares", &(), &result);
        result
    }

    fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError> {
        let result = self.inner.list_mapped_drives();
        record_result(&self.recorder, "inventory", "list_mapped_drives", &(), &result);
        result
    }
}
