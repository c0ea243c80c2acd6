//! Live drive probe checking for a volume root.

use crate::ports::drives::DriveProbe;

/// Probes `X:\` on the local machine.
pub struct LiveDriveProbe;

impl DriveProbe for LiveDriveProbe {
    #[cfg(windows)]
    fn is_present(&self, letter: char) -> bool {
        std::path::Path::new(&format!("{letter}:\\")).exists()
    }

    #[cfg(not(windows))]
    fn is_present(&self, _letter: char) -> bool {
        false
    }
}
