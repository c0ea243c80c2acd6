//! In-memory host that answers like Windows does.
//!
//! `SimulatedHost` keeps its own share table, connection table, folders and
//! volumes, and replies to each request with the text the real `net` tool or
//! the share script would print. Every clone shares the same state, so one
//! host can back the runner, inventory and drive probe of a context at once.
//! Used by the test suite and by `WINNMT_SIMULATE=1`.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::error::{InventoryError, LaunchError};
use crate::ports::drives::DriveProbe;
use crate::ports::inventory::{Inventory, MappedDriveRecord, ShareRecord};
use crate::ports::runner::{CancelToken, CommandResult, CommandRunner, RunError};
use crate::request::{share_name_for, CommandRequest, Intent};

/// Language of the `net` tool's messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// en-US wording.
    #[default]
    English,
    /// de-DE wording.
    German,
}

#[derive(Debug, Default)]
struct HostState {
    locale: Locale,
    shares: Vec<ShareRecord>,
    mappings: Vec<MappedDriveRecord>,
    folders: HashSet<String>,
    volumes: HashSet<char>,
    missing_programs: HashSet<String>,
    hold_mappings: bool,
    inventory_down: bool,
    connection_queries: usize,
    executed: Vec<CommandRequest>,
}

/// Shared handle to a simulated Windows host.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    state: Arc<Mutex<HostState>>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    /// A host with the default administrative shares and a `C:` volume.
    #[must_use]
    pub fn new() -> Self {
        let host = Self { state: Arc::new(Mutex::new(HostState::default())) };
        {
            let mut state = host.lock();
            for (name, path) in [("ADMIN$", r"C:\Windows"), ("C$", r"C:\"), ("IPC$", "")] {
                state.shares.push(ShareRecord { name: name.into(), local_path: path.into() });
            }
            state.volumes.insert('C');
            state.folders.insert(r"c:\windows".into());
        }
        host
    }

    /// Switches the wording of `net` messages.
    #[must_use]
    pub fn with_locale(self, locale: Locale) -> Self {
        self.lock().locale = locale;
        self
    }

    /// Adds an existing share.
    #[must_use]
    pub fn with_share(self, name: &str, local_path: &str) -> Self {
        {
            let mut state = self.lock();
            state.folders.insert(local_path.to_lowercase());
            state.shares.push(ShareRecord { name: name.into(), local_path: local_path.into() });
        }
        self
    }

    /// Adds an existing drive mapping.
    #[must_use]
    pub fn with_mapping(self, local_name: &str, remote_name: &str) -> Self {
        self.lock().mappings.push(MappedDriveRecord {
            local_name: local_name.into(),
            remote_name: remote_name.into(),
        });
        self
    }

    /// Adds a local volume.
    #[must_use]
    pub fn with_volume(self, letter: char) -> Self {
        self.lock().volumes.insert(letter.to_ascii_uppercase());
        self
    }

    /// Makes spawning `program` fail as if it were not installed.
    #[must_use]
    pub fn with_missing_program(self, program: &str) -> Self {
        self.lock().missing_programs.insert(program.to_string());
        self
    }

    /// Makes `net use` mappings hang until cancelled.
    #[must_use]
    pub fn with_held_mappings(self) -> Self {
        self.lock().hold_mappings = true;
        self
    }

    /// Makes every inventory query fail.
    #[must_use]
    pub fn with_failing_inventory(self) -> Self {
        self.lock().inventory_down = true;
        self
    }

    /// Requests that reached the host, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<CommandRequest> {
        self.lock().executed.clone()
    }

    /// Number of times the connection table was read.
    #[must_use]
    pub fn connection_queries(&self) -> usize {
        self.lock().connection_queries
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("simulated host lock poisoned")
    }

    fn hold_until_cancelled(cancel: &CancelToken) -> RunError {
        while !cancel.is_cancelled() {
            thread::sleep(Duration::from_millis(5));
        }
        RunError::Cancelled
    }
}

impl CommandRunner for SimulatedHost {
    fn run(&self, request: &CommandRequest, cancel: &CancelToken) -> Result<CommandResult, RunError> {
        let hold = {
            let mut state = self.lock();
            if state.missing_programs.contains(request.program()) {
                return Err(LaunchError::new(
                    request.program(),
                    io::Error::new(io::ErrorKind::NotFound, "program not found"),
                )
                .into());
            }
            state.executed.push(request.clone());
            state.hold_mappings && request.intent() == Intent::MapDrive
        };
        if hold {
            return Err(Self::hold_until_cancelled(cancel));
        }

        let mut state = self.lock();
        let result = match request.intent() {
            Intent::MapDrive => state.map(request),
            Intent::ShareFolder => state.share(request.subject()),
            Intent::UnshareFolder => state.unshare(request.subject()),
            Intent::UnmapDrive => state.unmap(request.subject()),
        };
        Ok(result)
    }
}

impl Inventory for SimulatedHost {
    fn list_shares(&self) -> Result<Vec<ShareRecord>, InventoryError> {
        let state = self.lock();
        if state.inventory_down {
            return Err(down("NetShareEnum"));
        }
        Ok(state.shares.clone())
    }

    fn list_mapped_drives(&self) -> Result<Vec<MappedDriveRecord>, InventoryError> {
        let mut state = self.lock();
        state.connection_queries += 1;
        if state.inventory_down {
            return Err(down("NetUseEnum"));
        }
        Ok(state.mappings.clone())
    }
}

impl DriveProbe for SimulatedHost {
    fn is_present(&self, letter: char) -> bool {
        self.lock().volumes.contains(&letter.to_ascii_uppercase())
    }
}

fn down(call: &'static str) -> InventoryError {
    InventoryError::QueryFailed { call, detail: "The RPC server is unavailable.".into() }
}

fn ok(output: impl Into<String>) -> CommandResult {
    CommandResult { output: output.into(), exit_code: 0 }
}

fn failed(output: impl Into<String>) -> CommandResult {
    CommandResult { output: output.into(), exit_code: 2 }
}

impl HostState {
    fn completed(&self) -> &'static str {
        match self.locale {
            Locale::English => "The command completed successfully.\r\n\r\n",
            Locale::German => "Der Befehl wurde erfolgreich ausgeführt.\r\n\r\n",
        }
    }

    fn map(&mut self, request: &CommandRequest) -> CommandResult {
        let drive = request.subject().to_ascii_uppercase();
        let remote = request.args().get(2).cloned().unwrap_or_default();
        let letter = drive.chars().next().unwrap_or_default();
        let taken = self.volumes.contains(&letter)
            || self.mappings.iter().any(|m| m.local_name.eq_ignore_ascii_case(&drive));
        if taken {
            return failed(match self.locale {
                Locale::English => {
                    "System error 85 has occurred.\r\n\r\nThe local device name is already in use.\r\n\r\n"
                }
                Locale::German => {
                    "Systemfehler 85 aufgetreten.\r\n\r\nDer lokale Gerätename wird bereits verwendet.\r\n\r\n"
                }
            });
        }
        self.mappings.push(MappedDriveRecord { local_name: drive, remote_name: remote });
        ok(self.completed())
    }

    fn share(&mut self, folder: &str) -> CommandResult {
        if self.shares.iter().any(|s| s.local_path.eq_ignore_ascii_case(folder)) {
            return ok("Folder is already shared.\r\n");
        }
        let created = self.folders.insert(folder.to_lowercase());
        let base = share_name_for(folder);
        let mut name = base.clone();
        let mut counter = 1;
        while self.shares.iter().any(|s| s.name.eq_ignore_ascii_case(&name)) {
            name = format!("{base}_{counter}");
            counter += 1;
        }
        self.shares.push(ShareRecord { name, local_path: folder.to_string() });
        ok(if created { "FolderCreatedAndShared\r\n" } else { "FolderShared\r\n" })
    }

    fn unshare(&mut self, name: &str) -> CommandResult {
        let before = self.shares.len();
        self.shares.retain(|s| !s.name.eq_ignore_ascii_case(name));
        if self.shares.len() < before {
            ok(format!("{name} was deleted successfully.\r\n\r\n"))
        } else {
            failed(
                "This shared resource does not exist.\r\n\r\nMore help is available by typing NET HELPMSG 2310.\r\n\r\n",
            )
        }
    }

    fn unmap(&mut self, local_name: &str) -> CommandResult {
        let before = self.mappings.len();
        self.mappings.retain(|m| !m.local_name.eq_ignore_ascii_case(local_name));
        if self.mappings.len() < before {
            ok(format!("{local_name} was deleted successfully.\r\n\r\n"))
        } else {
            failed(
                "The network connection could not be found.\r\n\r\nMore help is available by typing NET HELPMSG 2250.\r\n\r\n",
            )
        }
    }
}
