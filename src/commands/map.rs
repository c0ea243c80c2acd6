//! `winnmt map` command.

use crate::request::Intent;
use crate::session::Session;

/// Execute the `map` command.
///
/// Starts the mapping, waits for the worker and prints the log lines the
/// attempt produced.
///
/// # Errors
///
/// Returns an error string unless the drive was mapped.
pub fn run(session: &mut Session, ip: &str, share: &str, drive: &str) -> Result<(), String> {
    let start = session.log().len();
    let report = session.map_drive(ip, share, drive).map(|id| session.wait_for(id, None));
    super::print_log(session, start);
    match report {
        Ok(report) => super::finish(Intent::MapDrive.label(), report),
        Err(_) => Err(format!("could not {}", Intent::MapDrive.label())),
    }
}
