//! `winnmt unshare` and `winnmt unmap` commands.

use crate::error::OperationError;
use crate::inventory::Removal;
use crate::request::Intent;
use crate::session::Session;

/// Execute the `unshare` command.
///
/// # Errors
///
/// Returns an error string if the share could not be removed.
pub fn unshare(session: &mut Session, name: &str) -> Result<(), String> {
    let start = session.log().len();
    let removal = session.unshare(name);
    super::print_log(session, start);
    outcome(Intent::UnshareFolder, removal)
}

/// Execute the `unmap` command.
///
/// # Errors
///
/// Returns an error string if the drive could not be disconnected.
pub fn unmap(session: &mut Session, local_name: &str) -> Result<(), String> {
    let start = session.log().len();
    let removal = session.unmap(local_name);
    super::print_log(session, start);
    outcome(Intent::UnmapDrive, removal)
}

fn outcome(intent: Intent, removal: Result<Removal, OperationError>) -> Result<(), String> {
    match removal {
        Ok(Removal::Removed) => Ok(()),
        Ok(Removal::RemovalFailed(_)) | Err(_) => Err(format!("could not {}", intent.label())),
    }
}
