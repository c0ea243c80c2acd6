//! Binary entrypoint for the `winnmt` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Host selection (live, record, replay, simulate) happens in commands::dispatch.
    match winnmt::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
