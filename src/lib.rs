//! Core library entry for the `winnmt` CLI.
//!
//! Maps network drives with `net use`, shares folders through a PowerShell
//! `New-SmbShare` script, and lists or removes both. Long-running commands
//! execute on worker threads; their captured output is classified into an
//! outcome the operator can act on.

pub mod adapters;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod inventory;
pub mod ports;
pub mod request;
pub mod session;
pub mod telemetry;
pub mod transcript;
pub mod worker;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
/// `--help` and `--version` print to stdout and succeed.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["winnmt", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_succeeds_on_help_and_version() {
        assert!(run(["winnmt", "--help"]).is_ok());
        assert!(run(["winnmt", "--version"]).is_ok());
        assert!(run(["winnmt", "map", "--help"]).is_ok());
    }

    #[test]
    fn run_errors_on_missing_map_arguments() {
        let result = run(["winnmt", "map", "--ip", "10.0.0.5"]);
        assert!(result.unwrap_err().contains("--share"));
    }
}
