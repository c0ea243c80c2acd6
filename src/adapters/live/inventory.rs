//! Live inventory backed by the Win32 network-management API.
//!
//! Shares come from `NetShareEnum` at level 2 and connections from
//! `NetUseEnum` at level 0. Other platforms have no such tables and every
//! query fails.

use crate::error::InventoryError;
use crate::ports::inventory::{Inventory, MappedDriveRecord, ShareRecord};

/// Live inventory reading the local machine's tables.
pub struct LiveInventory;

impl Inventory for LiveInventory {
    fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError> {
        #[cfg(windows)]
        {
            win32::shares()
        }
        #[cfg(not(windows))]
        {
            Err(unsupported("NetShareEnum"))
        }
    }

    fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError> {
        #[cfg(windows)]
        {
            win32::connections()
        }
        #[cfg(not(windows))]
        {
            Err(unsupported("NetUseEnum"))
        }
    }
}

#[cfg(not(windows))]
fn unsupported(call: &'static str) -> InventoryError {
    InventoryError::QueryFailed { call, detail: "not available on this platform".into() }
}

#[cfg(windows)]
#[allow(unsafe_code)]
mod win32 {
    use std::ffi::c_void;

    use windows::core::{PCWSTR, PWSTR};
    use windows::Win32::NetworkManagement::NetManagement::{
        NetApiBufferFree, NetUseEnum, MAX_PREFERRED_LENGTH, USE_INFO_0,
    };
    use windows::Win32::Storage::FileSystem::{NetShareEnum, SHARE_INFO_2};

    use crate::error::InventoryError;
    use crate::ports::inventory::{MappedDriveRecord, ShareRecord};

    /// Owns a buffer allocated by a `Net*Enum` call.
    struct NetBuffer(*mut u8);

    impl Drop for NetBuffer {
        fn drop(&mut self) {
            if !self.0.is_null() {
                // SAFETY: the pointer came from a NetApi allocation and is freed once.
                unsafe {
                    NetApiBufferFree(Some(self.0.cast::<c_void>().cast_const()));
                }
            }
        }
    }

    impl NetBuffer {
        /// # Safety
        ///
        /// `T` must be the level struct the enumeration was asked for and
        /// `count` the number of entries it reported.
        unsafe fn entries<T>(&self, count: u32) -> &[T] {
            if self.0.is_null() || count == 0 {
                &[]
            } else {
                std::slice::from_raw_parts(self.0.cast::<T>(), count as usize)
            }
        }
    }

    fn failed(call: &'static str, status: u32) -> InventoryError {
        #[allow(clippy::cast_possible_wrap)]
        let detail = std::io::Error::from_raw_os_error(status as i32).to_string();
        InventoryError::QueryFailed { call, detail }
    }

    unsafe fn wide(text: PWSTR) -> String {
        if text.is_null() {
            String::new()
        } else {
            text.to_string().unwrap_or_default()
        }
    }

    pub(super) fn shares() -> Result<Vec<ShareRecord>, InventoryError> {
        let mut raw: *mut u8 = std::ptr::null_mut();
        let mut read = 0u32;
        let mut total = 0u32;
        // SAFETY: all out-pointers are valid for the duration of the call.
        let status = unsafe {
            NetShareEnum(PCWSTR::null(), 2, &mut raw, MAX_PREFERRED_LENGTH, &mut read, &mut total, None)
        };
        let buffer = NetBuffer(raw);
        if status != 0 {
            return Err(failed("NetShareEnum", status));
        }
        // SAFETY: level 2 was requested and `read` entries were returned.
        let entries = unsafe { buffer.entries::<SHARE_INFO_2>(read) };
        Ok(entries
            .iter()
            .map(|e| ShareRecord {
                // SAFETY: strings live inside `buffer`, which outlives this map.
                name: unsafe { wide(e.shi2_netname) },
                local_path: unsafe { wide(e.shi2_path) },
            })
            .collect())
    }

    pub(super) fn connections() -> Result<Vec<MappedDriveRecord>, InventoryError> {
        let mut raw: *mut u8 = std::ptr::null_mut();
        let mut read = 0u32;
        let mut total = 0u32;
        // SAFETY: all out-pointers are valid for the duration of the call.
        let status = unsafe {
            NetUseEnum(
                PCWSTR::null(),
                0,
                Some(std::ptr::addr_of_mut!(raw)),
                MAX_PREFERRED_LENGTH,
                Some(std::ptr::addr_of_mut!(read)),
                &mut total,
                None,
            )
        };
        let buffer = NetBuffer(raw);
        if status != 0 {
            return Err(failed("NetUseEnum", status));
        }
        // SAFETY: level 0 was requested and `read` entries were returned.
        let entries = unsafe { buffer.entries::<USE_INFO_0>(read) };
        Ok(entries
            .iter()
            .map(|e| MappedDriveRecord {
                // SAFETY: strings live inside `buffer`, which outlives this map.
                local_name: unsafe { wide(e.ui0_local) },
                remote_name: unsafe { wide(e.ui0_remote) },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn queries_fail_off_windows() {
        let err = LiveInventory.list_shares().unwrap_err();
        assert!(err.to_string().starts_with("NetShareEnum failed"));
        assert!(LiveInventory.list_mapped_drives().is_err());
    }

    #[cfg(windows)]
    #[test]
    fn share_table_is_readable() {
        let shares = LiveInventory.list_shares().unwrap();
        assert!(shares.iter().any(|s| s.name.eq_ignore_ascii_case("IPC$")));
    }

    #[cfg(windows)]
    #[test]
    fn connection_table_is_readable() {
        let drives = LiveInventory.list_mapped_drives().unwrap();
        assert!(drives.iter().all(|d| !d.remote_name.is_empty()));
    }
}
