//! The control loop that owns all operator-visible state.
//!
//! A `Session` holds the input form, the timestamped log, the inventory
//! tables and one operation slot each for mapping and sharing. It is only
//! ever touched from the thread that owns it. Long-running commands run on
//! workers, and their results come back as `Event`s on the session's
//! channel, to be handed to `apply`.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

use crate::classify::{classify_result, FollowUp, Outcome, SuccessKind};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::OperationError;
use crate::inventory::{free_drive_letters, InventoryReader, Removal};
use crate::ports::inventory::{MappedDriveRecord, ShareRecord};
use crate::request::{CommandRequest, Intent};
use crate::worker::{self, OperationId, WorkerEvent, WorkerHandle};

/// Everything that can wake the control loop.
#[derive(Debug)]
pub enum Event {
    /// A worker finished or stopped.
    Worker(WorkerEvent),
    /// A line typed by the operator.
    Input(String),
    /// The operator's input stream ended.
    InputClosed,
}

impl From<WorkerEvent> for Event {
    fn from(event: WorkerEvent) -> Self {
        Self::Worker(event)
    }
}

/// State of one operation slot.
#[derive(Debug, Default)]
pub enum OperationState {
    /// Nothing in flight; a new operation may start.
    #[default]
    Idle,
    /// A worker is running.
    Running(WorkerHandle),
    /// The worker was told to stop and has not acknowledged yet.
    Cancelling(OperationId),
}

impl OperationState {
    /// Whether a new operation may start.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the in-flight or stopping operation.
    #[must_use]
    pub fn id(&self) -> Option<OperationId> {
        match self {
            Self::Idle => None,
            Self::Running(handle) => Some(handle.id()),
            Self::Cancelling(id) => Some(*id),
        }
    }
}

/// One line of the operator log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// When the line was logged.
    pub at: DateTime<Utc>,
    /// The message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.at.with_timezone(&Local);
        write!(f, "{}: {}", local.format("%Y-%m-%d %H:%M:%S"), self.message)
    }
}

/// The input fields the operator fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    /// Remote host address.
    pub ip: String,
    /// Remote share name.
    pub share: String,
    /// Drive letter to map, such as `Z:`.
    pub drive_letter: String,
    /// Local folder to share.
    pub folder_path: String,
}

impl Form {
    /// Clears the text fields. The drive letter stays selected.
    pub fn reset(&mut self) {
        self.ip.clear();
        self.share.clear();
        self.folder_path.clear();
    }
}

/// Final word on one operation.
#[derive(Debug)]
pub struct Report {
    /// Operation the report is about.
    pub id: OperationId,
    /// What the operation was for.
    pub intent: Intent,
    /// Success kind, or what went wrong.
    pub result: Result<SuccessKind, OperationError>,
}

/// Operator session over one service context.
pub struct Session {
    ctx: ServiceContext,
    settings: Settings,
    form: Form,
    log: Vec<LogEntry>,
    shares: Vec<ShareRecord>,
    mapped: Vec<MappedDriveRecord>,
    free_letters: Vec<String>,
    mapping: OperationState,
    sharing: OperationState,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Session {
    /// Creates a session. Call `refresh` to populate the tables.
    #[must_use]
    pub fn new(ctx: ServiceContext, settings: Settings) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            ctx,
            settings,
            form: Form::default(),
            log: Vec::new(),
            shares: Vec::new(),
            mapped: Vec::new(),
            free_letters: Vec::new(),
            mapping: OperationState::Idle,
            sharing: OperationState::Idle,
            tx,
            rx,
        }
    }

    /// Sender for feeding operator input into the loop.
    #[must_use]
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Current form contents.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Mutable access to the form.
    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Log lines, oldest first.
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Empties the log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Shares from the last refresh, without `IPC$`.
    #[must_use]
    pub fn shares(&self) -> &[ShareRecord] {
        &self.shares
    }

    /// Mapped drives from the last refresh.
    #[must_use]
    pub fn mapped_drives(&self) -> &[MappedDriveRecord] {
        &self.mapped
    }

    /// Free drive letters from the last refresh.
    #[must_use]
    pub fn free_letters(&self) -> &[String] {
        &self.free_letters
    }

    /// The mapping slot.
    #[must_use]
    pub fn mapping_state(&self) -> &OperationState {
        &self.mapping
    }

    /// The sharing slot.
    #[must_use]
    pub fn sharing_state(&self) -> &OperationState {
        &self.sharing
    }

    /// Fills the mapping fields and submits them.
    ///
    /// # Errors
    ///
    /// See `submit_mapping`.
    pub fn map_drive(
        &mut self,
        ip: &str,
        share: &str,
        drive: &str,
    ) -> Result<OperationId, OperationError> {
        self.form.ip = ip.to_string();
        self.form.share = share.to_string();
        self.form.drive_letter = drive.to_string();
        self.submit_mapping()
    }

    /// Starts mapping the drive described by the form.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Busy` while a mapping is in flight and
    /// `OperationError::Validation` for bad input. Either is logged and no
    /// command is issued.
    pub fn submit_mapping(&mut self) -> Result<OperationId, OperationError> {
        if let Some(id) = self.mapping.id() {
            debug!(%id, "mapping refused, slot busy");
            return self.validated(Err(OperationError::Busy(Intent::MapDrive)));
        }
        let request = CommandRequest::map_drive(
            &self.form.ip,
            &self.form.share,
            &self.form.drive_letter,
            &self.settings.commands,
        );
        let request = self.validated(request)?;
        let handle = worker::spawn(self.ctx.runner.clone(), request, &self.tx);
        let id = handle.id();
        self.mapping = OperationState::Running(handle);
        self.record("Mapping network drive...");
        Ok(id)
    }

    /// Fills the folder field and submits it.
    ///
    /// # Errors
    ///
    /// See `submit_sharing`.
    pub fn share_folder(&mut self, folder: &str) -> Result<OperationId, OperationError> {
        self.form.folder_path = folder.to_string();
        self.submit_sharing()
    }

    /// Starts sharing the folder described by the form.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Busy` while a share is in flight and
    /// `OperationError::Validation` for bad input. Either is logged and no
    /// command is issued.
    pub fn submit_sharing(&mut self) -> Result<OperationId, OperationError> {
        if let Some(id) = self.sharing.id() {
            debug!(%id, "sharing refused, slot busy");
            return self.validated(Err(OperationError::Busy(Intent::ShareFolder)));
        }
        let request = CommandRequest::share_folder(&self.form.folder_path, &self.settings.commands);
        let request = self.validated(request)?;
        let handle = worker::spawn(self.ctx.runner.clone(), request, &self.tx);
        let id = handle.id();
        self.sharing = OperationState::Running(handle);
        self.record("Sharing folder...");
        Ok(id)
    }

    /// Kills an in-flight mapping. Returns `false` if none was running.
    ///
    /// The slot stays `Cancelling` until the worker acknowledges; whatever
    /// the worker reports then is discarded.
    pub fn stop_mapping(&mut self) -> bool {
        match std::mem::take(&mut self.mapping) {
            OperationState::Running(handle) => {
                handle.cancel();
                info!(id = %handle.id(), "mapping cancelled");
                self.mapping = OperationState::Cancelling(handle.id());
                self.record("Stopped mapping network drive.");
                true
            }
            other => {
                self.mapping = other;
                false
            }
        }
    }

    /// Removes a share, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Validation` for a blank name.
    pub fn unshare(&mut self, name: &str) -> Result<Removal, OperationError> {
        let removal = {
            let reader = self.reader();
            reader.remove_share(name)
        };
        let removal = self.validated(removal)?;
        match &removal {
            Removal::Removed => self.record(format!("Share {} removed.", name.trim())),
            Removal::RemovalFailed(message) => {
                self.record(format!("Failed to remove share {}: {message}", name.trim()));
            }
        }
        self.refresh();
        Ok(removal)
    }

    /// Drops a drive mapping, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Validation` for a blank name.
    pub fn unmap(&mut self, local_name: &str) -> Result<Removal, OperationError> {
        let removal = {
            let reader = self.reader();
            reader.remove_mapped_drive(local_name)
        };
        let removal = self.validated(removal)?;
        match &removal {
            Removal::Removed => self.record(format!("Drive {} disconnected.", local_name.trim())),
            Removal::RemovalFailed(message) => {
                self.record(format!("Failed to disconnect {}: {message}", local_name.trim()));
            }
        }
        self.refresh();
        Ok(removal)
    }

    /// Re-reads shares, mapped drives and free letters. Returns `false` if
    /// any query failed.
    ///
    /// A failed query is logged and leaves that table as it was.
    pub fn refresh(&mut self) -> bool {
        let (shares, mapped) = {
            let reader = self.reader();
            (reader.list_shares(), reader.list_mapped_drives())
        };
        let mut complete = true;
        match shares {
            Ok(shares) => self.shares = shares,
            Err(err) => {
                complete = false;
                self.report_error(&err.into());
            }
        }
        match mapped {
            Ok(mapped) => {
                // Letters come from the same snapshot as the table.
                let letters = free_drive_letters(self.ctx.drives.as_ref(), &mapped);
                if !letters.contains(&self.form.drive_letter) {
                    self.form.drive_letter = letters.first().cloned().unwrap_or_default();
                }
                self.free_letters = letters;
                self.mapped = mapped;
            }
            Err(err) => {
                complete = false;
                self.report_error(&err.into());
            }
        }
        complete
    }

    /// Waits for the next event. `None` on timeout.
    #[must_use]
    pub fn next_event(&self, timeout: Option<Duration>) -> Option<Event> {
        match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(event) => Some(event),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
            },
            // The session holds a sender, so the channel never disconnects.
            None => self.rx.recv().ok(),
        }
    }

    /// Handles every event already queued, without blocking.
    pub fn pump(&mut self) -> Vec<Report> {
        let mut reports = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Event::Worker(event) => reports.extend(self.apply(event)),
                other => debug!(?other, "ignoring non-worker event while pumping"),
            }
        }
        reports
    }

    /// Blocks until operation `id` reports, is stopped, or `timeout` passes.
    pub fn wait_for(&mut self, id: OperationId, timeout: Option<Duration>) -> Option<Report> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.mapping.id() != Some(id) && self.sharing.id() != Some(id) {
                return None;
            }
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if remaining == Some(Duration::ZERO) {
                return None;
            }
            match self.next_event(remaining)? {
                Event::Worker(event) => {
                    let event_id = event.id();
                    if let Some(report) = self.apply(event) {
                        if event_id == id {
                            return Some(report);
                        }
                    }
                }
                other => debug!(?other, "ignoring non-worker event while waiting"),
            }
        }
    }

    /// Applies a worker's result to the session.
    ///
    /// Events for operations the session no longer tracks are dropped.
    pub fn apply(&mut self, event: WorkerEvent) -> Option<Report> {
        let id = event.id();
        let slot = if self.mapping.id() == Some(id) {
            &mut self.mapping
        } else if self.sharing.id() == Some(id) {
            &mut self.sharing
        } else {
            debug!(%id, "dropping event for untracked operation");
            return None;
        };

        let state = std::mem::take(slot);
        if let OperationState::Cancelling(_) = state {
            debug!(%id, "stopped operation acknowledged");
            self.refresh();
            return None;
        }

        match event {
            WorkerEvent::Stopped { .. } => {
                self.refresh();
                None
            }
            WorkerEvent::Completed { intent, result: Err(err), .. } => {
                let err = OperationError::CommandLaunch(err);
                self.report_error(&err);
                Some(Report { id, intent, result: Err(err) })
            }
            WorkerEvent::Completed { intent, result: Ok(result), .. } => {
                let outcome = classify_result(&result, intent, self.settings.classify);
                info!(%id, ?intent, ?outcome, "classified");
                self.record(outcome.describe(intent));
                self.follow(outcome.follow_up());
                let result = match outcome {
                    Outcome::Success(kind) => Ok(kind),
                    Outcome::KnownFailure(kind) => Err(OperationError::KnownOperation(kind)),
                    Outcome::UnknownFailure(raw) => Err(OperationError::UnknownOperation(raw)),
                };
                Some(Report { id, intent, result })
            }
        }
    }

    fn follow(&mut self, follow: FollowUp) {
        if follow.reset_fields {
            self.form.reset();
        }
        if follow.refresh_inventory {
            self.refresh();
        }
    }

    fn reader(&self) -> InventoryReader<'_> {
        InventoryReader::new(self.ctx.inventory.as_ref(), self.ctx.runner.as_ref())
    }

    fn validated<T, E>(&mut self, result: Result<T, E>) -> Result<T, OperationError>
    where
        E: Into<OperationError>,
    {
        result.map_err(|err| {
            let err = err.into();
            self.report_error(&err);
            err
        })
    }

    fn report_error(&mut self, err: &OperationError) {
        self.record(err.to_string());
    }

    fn record(&mut self, message: impl Into<String>) {
        let entry = LogEntry { at: self.ctx.clock.now(), message: message.into() };
        info!(target: "winnmt::log", "{}", entry.message);
        self.log.push(entry);
    }
}
