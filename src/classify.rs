//! Outcome classification of captured command output.
//!
//! The `net` tool and the share script only report what happened as text, so
//! the verdict comes from an ordered substring table per intent. The first
//! matching needle wins. Output that matches nothing is an
//! `UnknownFailure` carrying the text verbatim so the operator can read it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ports::runner::CommandResult;
use crate::request::Intent;

/// Successful results the classifier can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessKind {
    /// `net use` bound the drive letter.
    Mapped,
    /// The share script published an existing folder.
    Shared,
    /// The share script created the folder and then published it.
    CreatedAndShared,
}

/// Failures the classifier can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// System error 85: the drive letter is already mapped.
    DeviceNameInUse,
    /// A share for the folder path already exists.
    AlreadyShared,
    /// The share was created but granting full control failed.
    AclUpdateFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DeviceNameInUse => "The local device name is already in use.",
            Self::AlreadyShared => "Folder is already shared.",
            Self::AclUpdateFailed => "Failed to update the ACL for full control.",
        })
    }
}

/// Verdict on one completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation did what was asked.
    Success(SuccessKind),
    /// The operation failed in a way we have a message for.
    KnownFailure(FailureKind),
    /// Output matched nothing; the raw text is kept as-is.
    UnknownFailure(String),
}

/// What the calling layer should do after logging an outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowUp {
    /// Clear the input fields.
    pub reset_fields: bool,
    /// Re-read shares, mappings and free drive letters.
    pub refresh_inventory: bool,
}

impl Outcome {
    /// `true` for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The log line shown for this outcome of an `intent` command.
    #[must_use]
    pub fn describe(&self, intent: Intent) -> String {
        match self {
            Self::Success(SuccessKind::Mapped) => "Network drive mapped successfully.".into(),
            Self::Success(SuccessKind::Shared) => "Folder has been shared successfully.".into(),
            Self::Success(SuccessKind::CreatedAndShared) => {
                "Folder created and shared successfully.".into()
            }
            Self::KnownFailure(kind) => kind.to_string(),
            Self::UnknownFailure(raw) => match intent {
                Intent::MapDrive => format!("Failed to map network drive: {raw}"),
                Intent::ShareFolder => format!("Failed to share the folder:\n\n{raw}"),
                Intent::UnshareFolder | Intent::UnmapDrive => {
                    format!("Failed to {}: {raw}", intent.label())
                }
            },
        }
    }

    /// Follow-up actions. Every success resets the form and refreshes the
    /// inventory; failures leave both alone.
    #[must_use]
    pub fn follow_up(&self) -> FollowUp {
        if self.is_success() {
            FollowUp { reset_fields: true, refresh_inventory: true }
        } else {
            FollowUp::default()
        }
    }
}

/// How much weight the exit status carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassifyMode {
    /// Text table first; unmatched output with exit code 0 counts as the
    /// intent's default success. Works on non-English hosts.
    #[default]
    ExitStatus,
    /// Text table only, exactly as the desktop tool behaved.
    Text,
}

impl FromStr for ClassifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exit-status" | "exit_status" | "status" => Ok(Self::ExitStatus),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown classify mode {other:?}")),
        }
    }
}

#[derive(Clone, Copy)]
enum Verdict {
    Success(SuccessKind),
    Failure(FailureKind),
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Success(kind) => Self::Success(kind),
            Verdict::Failure(kind) => Self::KnownFailure(kind),
        }
    }
}

type Rule = (&'static str, Verdict);

const MAP_RULES: &[Rule] = &[
    ("The command completed successfully.", Verdict::Success(SuccessKind::Mapped)),
    ("System error 85", Verdict::Failure(FailureKind::DeviceNameInUse)),
];

// "already shared" must stay ahead of the success markers.
const SHARE_RULES: &[Rule] = &[
    ("already shared", Verdict::Failure(FailureKind::AlreadyShared)),
    ("FolderAlreadyShared", Verdict::Failure(FailureKind::AlreadyShared)),
    ("FailedToUpdateACL", Verdict::Failure(FailureKind::AclUpdateFailed)),
    ("FolderCreatedAndShared", Verdict::Success(SuccessKind::CreatedAndShared)),
    ("FolderShared", Verdict::Success(SuccessKind::Shared)),
];

fn rules_for(intent: Intent) -> &'static [Rule] {
    match intent {
        Intent::MapDrive => MAP_RULES,
        Intent::ShareFolder => SHARE_RULES,
        Intent::UnshareFolder | Intent::UnmapDrive => &[],
    }
}

/// Classifies raw output of an `intent` command by text alone.
#[must_use]
pub fn classify(raw: &str, intent: Intent) -> Outcome {
    rules_for(intent)
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map_or_else(|| Outcome::UnknownFailure(raw.to_string()), |&(_, verdict)| verdict.into())
}

/// Classifies a completed command, consulting the exit status per `mode`.
#[must_use]
pub fn classify_result(result: &CommandResult, intent: Intent, mode: ClassifyMode) -> Outcome {
    let outcome = classify(&result.output, intent);
    let unmatched = matches!(outcome, Outcome::UnknownFailure(_));
    if unmatched && mode == ClassifyMode::ExitStatus && result.success() {
        if let Some(kind) = default_success(intent) {
            return Outcome::Success(kind);
        }
    }
    outcome
}

fn default_success(intent: Intent) -> Option<SuccessKind> {
    match intent {
        Intent::MapDrive => Some(SuccessKind::Mapped),
        Intent::ShareFolder => Some(SuccessKind::Shared),
        Intent::UnshareFolder | Intent::UnmapDrive => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(output: &str, exit_code: i32) -> CommandResult {
        CommandResult { output: output.into(), exit_code }
    }

    #[test]
    fn mapping_success_phrase() {
        assert_eq!(
            classify("The command completed successfully.\r\n\r\n", Intent::MapDrive),
            Outcome::Success(SuccessKind::Mapped)
        );
    }

    #[test]
    fn mapping_device_in_use() {
        let raw = "System error 85 has occurred.\r\n\r\nThe local device name is already in use.";
        let outcome = classify(raw, Intent::MapDrive);
        assert_eq!(outcome, Outcome::KnownFailure(FailureKind::DeviceNameInUse));
        assert_eq!(outcome.describe(Intent::MapDrive), "The local device name is already in use.");
        assert_eq!(outcome.follow_up(), FollowUp::default());
    }

    #[test]
    fn share_markers() {
        let cases = [
            ("Folder is already shared.", Outcome::KnownFailure(FailureKind::AlreadyShared)),
            ("FolderAlreadyShared", Outcome::KnownFailure(FailureKind::AlreadyShared)),
            ("FailedToUpdateACL: denied", Outcome::KnownFailure(FailureKind::AclUpdateFailed)),
            ("FolderCreatedAndShared", Outcome::Success(SuccessKind::CreatedAndShared)),
            ("FolderShared", Outcome::Success(SuccessKind::Shared)),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify(raw, Intent::ShareFolder), expected, "{raw}");
        }
    }

    #[test]
    fn earlier_rule_wins() {
        let raw = "Folder is already shared.\nFailedToUpdateACL\nFolderShared";
        assert_eq!(
            classify(raw, Intent::ShareFolder),
            Outcome::KnownFailure(FailureKind::AlreadyShared)
        );
        // FolderCreatedAndShared does not contain FolderShared, so order is what decides.
        assert_eq!(
            classify("FolderShared\nFolderCreatedAndShared", Intent::ShareFolder),
            Outcome::Success(SuccessKind::CreatedAndShared)
        );
    }

    #[test]
    fn unknown_output_is_kept_verbatim() {
        let raw = "System error 53 has occurred.\r\n\r\nThe network path was not found.\r\n";
        match classify(raw, Intent::MapDrive) {
            Outcome::UnknownFailure(text) => assert_eq!(text, raw),
            other => panic!("expected unknown failure, got {other:?}"),
        }
        assert_eq!(
            classify(raw, Intent::MapDrive).describe(Intent::MapDrive),
            format!("Failed to map network drive: {raw}")
        );
    }

    #[test]
    fn text_mode_misses_localized_success() {
        let german = result("Der Befehl wurde erfolgreich ausgeführt.\r\n", 0);
        assert!(matches!(
            classify_result(&german, Intent::MapDrive, ClassifyMode::Text),
            Outcome::UnknownFailure(_)
        ));
        assert_eq!(
            classify_result(&german, Intent::MapDrive, ClassifyMode::ExitStatus),
            Outcome::Success(SuccessKind::Mapped)
        );
    }

    #[test]
    fn exit_status_mode_keeps_text_precedence() {
        let already = result("Folder is already shared.\r\n", 0);
        assert_eq!(
            classify_result(&already, Intent::ShareFolder, ClassifyMode::ExitStatus),
            Outcome::KnownFailure(FailureKind::AlreadyShared)
        );
        let failed = result("Systemfehler 85 aufgetreten.", 2);
        assert!(matches!(
            classify_result(&failed, Intent::MapDrive, ClassifyMode::ExitStatus),
            Outcome::UnknownFailure(_)
        ));
    }

    #[test]
    fn successes_reset_and_refresh() {
        let follow = Outcome::Success(SuccessKind::Shared).follow_up();
        assert!(follow.reset_fields && follow.refresh_inventory);
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("exit-status".parse::<ClassifyMode>(), Ok(ClassifyMode::ExitStatus));
        assert_eq!("TEXT".parse::<ClassifyMode>(), Ok(ClassifyMode::Text));
        assert!("fuzzy".parse::<ClassifyMode>().is_err());
    }
}
