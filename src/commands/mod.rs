//! Command dispatch and handlers.

pub mod console;
pub mod drives;
pub mod list;
pub mod map;
pub mod remove;
pub mod share;

use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::session::{Report, Session};
use crate::telemetry;

/// Dispatch a parsed command to its handler.
///
/// Settings come from the environment. `WINNMT_RECORD`, `WINNMT_REPLAY` and
/// `WINNMT_SIMULATE` choose which host the session talks to; a recorded
/// transcript is written when the session is dropped.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the command fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::from_env().map_err(|err| err.to_string())?;
    telemetry::init(&settings.log_filter);
    let ctx = ServiceContext::for_mode(&settings.host)?;
    let mut session = Session::new(ctx, settings);
    dispatch_with_session(command, &mut session)
}

/// Dispatch a command against an existing session.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_session(command: &Command, session: &mut Session) -> Result<(), String> {
    match command {
        Command::Map { ip, share, drive } => map::run(session, ip, share, drive),
        Command::Share { path } => share::run(session, path),
        Command::Unshare { name } => remove::unshare(session, name),
        Command::Unmap { local_name } => remove::unmap(session, local_name),
        Command::List { json } => list::run(session, *json),
        Command::Drives => drives::run(session),
        Command::Console => console::run(session),
    }
}

/// Prints log lines from index `from` on, oldest first.
fn print_log(session: &Session, from: usize) {
    for entry in session.log().iter().skip(from) {
        println!("{entry}");
    }
}

/// Turns the final report of a one-shot operation into the exit result.
fn finish(label: &str, report: Option<Report>) -> Result<(), String> {
    match report {
        Some(Report { result: Ok(_), .. }) => Ok(()),
        Some(Report { result: Err(_), .. }) => Err(format!("could not {label}")),
        None => Err(format!("{label} did not complete")),
    }
}
