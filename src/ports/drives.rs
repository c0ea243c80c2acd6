//! Drive probe port for checking which drive letters are occupied locally.

/// Reports whether a drive letter is backed by a local volume.
///
/// Abstracted so free-letter computation can be tested without real disks.
pub trait DriveProbe: Send + Sync {
    /// Returns `true` if `letter` (`'A'..='Z'`) names an existing volume.
    fn is_present(&self, letter: char) -> bool;
}
