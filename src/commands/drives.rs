//! `winnmt drives` command.

use crate::session::Session;

/// Execute the `drives` command: free drive letters, space separated.
///
/// # Errors
///
/// Returns an error string if the connection table could not be read.
pub fn run(session: &mut Session) -> Result<(), String> {
    let start = session.log().len();
    if !session.refresh() {
        super::print_log(session, start);
        return Err("could not read the connection table".into());
    }
    if session.free_letters().is_empty() {
        println!("No free drive letters.");
    } else {
        println!("{}", session.free_letters().join(" "));
    }
    Ok(())
}
