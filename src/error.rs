//! Error types shared across the crate.
//!
//! Port traits return the narrow errors (`LaunchError`, `InventoryError`);
//! the session folds everything an operator can see into `OperationError`.

use std::io;

use thiserror::Error;

use crate::classify::FailureKind;
use crate::request::Intent;

/// Malformed user input, caught before any command is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The remote host field was empty.
    #[error("Please enter an IP address.")]
    EmptyAddress,
    /// The remote share field was empty.
    #[error("Please enter a shared folder.")]
    EmptyShare,
    /// The drive letter is not of the form `X:`.
    #[error("Please select a valid drive letter (got {0:?}).")]
    InvalidDriveLetter(String),
    /// The folder path does not start with a drive root such as `C:\`.
    #[error("Please enter a valid directory path with a root drive.")]
    NotDriveRooted(String),
    /// A share or device name for removal was empty.
    #[error("Please enter a name to remove.")]
    EmptyName,
}

/// The external process could not be started.
#[derive(Debug, Error)]
#[error("failed to start {program}: {source}")]
pub struct LaunchError {
    /// Program that was being spawned.
    pub program: String,
    /// Underlying spawn failure.
    #[source]
    pub source: io::Error,
}

impl LaunchError {
    /// Wraps a spawn failure for `program`.
    pub fn new(program: impl Into<String>, source: io::Error) -> Self {
        Self { program: program.into(), source }
    }
}

/// An OS enumeration call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The share or connection enumeration returned an error.
    #[error("{call} failed: {detail}")]
    QueryFailed {
        /// Name of the OS call that failed.
        call: &'static str,
        /// OS-provided error text or status code.
        detail: String,
    },
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable held a value outside its accepted set.
    #[error("{key} has invalid value {value:?}: expected {expected}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Value that was found.
        value: String,
        /// Human description of what is accepted.
        expected: &'static str,
    },
    /// Recording and replaying were both requested.
    #[error("WINNMT_RECORD and WINNMT_REPLAY cannot be set together")]
    RecordAndReplay,
}

/// Everything the operator can be told went wrong with an operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Input was rejected before a command was built.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The command could not be started.
    #[error(transparent)]
    CommandLaunch(#[from] LaunchError),
    /// The command ran and reported a recognised failure.
    #[error("{0}")]
    KnownOperation(FailureKind),
    /// The command ran and its output matched nothing known.
    #[error("unrecognised command output: {0}")]
    UnknownOperation(String),
    /// Listing shares or mapped drives failed.
    #[error(transparent)]
    InventoryQuery(#[from] InventoryError),
    /// An operation of the same kind is still in flight.
    #[error("Cannot {} while a previous request is still running.", .0.label())]
    Busy(Intent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_error_names_program() {
        let err = LaunchError::new("net", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("failed to start net:"));
    }

    #[test]
    fn validation_messages_are_operator_facing() {
        assert_eq!(ValidationError::EmptyAddress.to_string(), "Please enter an IP address.");
        assert_eq!(
            ValidationError::NotDriveRooted("data".into()).to_string(),
            "Please enter a valid directory path with a root drive."
        );
    }

    #[test]
    fn operation_error_wraps_inventory_failure() {
        let err: OperationError =
            InventoryError::QueryFailed { call: "NetShareEnum", detail: "status 5".into() }.into();
        assert_eq!(err.to_string(), "NetShareEnum failed: status 5");
    }

    #[test]
    fn busy_names_the_operation() {
        assert_eq!(
            OperationError::Busy(Intent::MapDrive).to_string(),
            "Cannot map network drive while a previous request is still running."
        );
    }
}
