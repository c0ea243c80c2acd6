//! `winnmt share` command.

use crate::request::Intent;
use crate::session::Session;

/// Execute the `share` command.
///
/// # Errors
///
/// Returns an error string unless the folder ended up shared.
pub fn run(session: &mut Session, path: &str) -> Result<(), String> {
    let start = session.log().len();
    let report = session.share_folder(path).map(|id| session.wait_for(id, None));
    super::print_log(session, start);
    match report {
        Ok(report) => super::finish(Intent::ShareFolder.label(), report),
        Err(_) => Err(format!("could not {}", Intent::ShareFolder.label())),
    }
}
