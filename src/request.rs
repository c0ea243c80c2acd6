//! Command requests and the input validation that guards their construction.
//!
//! Every administrative operation is one external command. The constructors
//! here are the only place user input turns into a command line, so a
//! `CommandRequest` built through them is always well-formed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

static DRIVE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:$").expect("drive letter pattern compiles"));
static DRIVE_ROOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]:\\").expect("drive root pattern compiles"));

/// What a command is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Bind a local drive letter to a remote share.
    MapDrive,
    /// Publish a local folder as an SMB share.
    ShareFolder,
    /// Delete a published share.
    UnshareFolder,
    /// Drop a drive mapping.
    UnmapDrive,
}

impl Intent {
    /// Short operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MapDrive => "map network drive",
            Self::ShareFolder => "share folder",
            Self::UnshareFolder => "remove share",
            Self::UnmapDrive => "disconnect drive",
        }
    }
}

/// Knobs that change how commands are composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    /// Whether drive mappings survive a logoff.
    pub persistent: bool,
    /// Account granted full access on newly shared folders.
    pub principal: String,
    /// PowerShell executable used for the share script.
    pub powershell: String,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self { persistent: true, principal: "Everyone".into(), powershell: "powershell".into() }
    }
}

/// A fully-formed external command and the intent it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    intent: Intent,
    subject: String,
    program: String,
    args: Vec<String>,
}

impl CommandRequest {
    /// Builds a request without validation.
    ///
    /// Callers that take user input should use the intent-specific
    /// constructors instead.
    pub fn new<I, S>(
        intent: Intent,
        subject: impl Into<String>,
        program: impl Into<String>,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intent,
            subject: subject.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `net use <drive> "\\<ip>\<share>" /persistent:yes`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `ip` or `share` is blank or `drive` is
    /// not a single letter followed by a colon.
    pub fn map_drive(
        ip: &str,
        share: &str,
        drive: &str,
        options: &CommandOptions,
    ) -> Result<Self, ValidationError> {
        let ip = ip.trim().trim_start_matches('\\');
        if ip.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        let share = share.trim().trim_matches('\\');
        if share.is_empty() {
            return Err(ValidationError::EmptyShare);
        }
        let drive = drive.trim();
        if !DRIVE_LETTER.is_match(drive) {
            return Err(ValidationError::InvalidDriveLetter(drive.to_string()));
        }
        let drive = drive.to_ascii_uppercase();
        let remote = format!(r"\\{ip}\{share}");
        let persistent = if options.persistent { "/persistent:yes" } else { "/persistent:no" };
        Ok(Self::new(
            Intent::MapDrive,
            drive.clone(),
            "net",
            ["use".to_string(), drive, remote, persistent.to_string()],
        ))
    }

    /// Runs the share script for `folder` through PowerShell.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotDriveRooted` unless the path (after
    /// turning `/` into `\`) starts with a drive root.
    pub fn share_folder(folder: &str, options: &CommandOptions) -> Result<Self, ValidationError> {
        let folder = normalize_folder(folder)?;
        let script = share_script(&folder, &share_name_for(&folder), &options.principal);
        Ok(Self::new(
            Intent::ShareFolder,
            folder,
            options.powershell.clone(),
            ["-NoProfile".to_string(), "-NonInteractive".into(), "-Command".into(), script],
        ))
    }

    /// `net share <name> /delete`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyName` for a blank name.
    pub fn unshare_folder(name: &str) -> Result<Self, ValidationError> {
        let name = non_empty(name)?;
        Ok(Self::new(Intent::UnshareFolder, name, "net", ["share", name, "/delete"]))
    }

    /// `net use <name> /delete`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyName` for a blank name.
    pub fn unmap_drive(local_name: &str) -> Result<Self, ValidationError> {
        let name = non_empty(local_name)?;
        Ok(Self::new(Intent::UnmapDrive, name, "net", ["use", name, "/delete"]))
    }

    /// The intent this command serves.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Drive letter, folder path or name the command acts on.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Executable to spawn.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandRequest {
    /// Renders the command line the way it would be typed at a prompt.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains('\n') {
                f.write_str(" <script>")?;
            } else if arg.contains(' ') || arg.starts_with(r"\\") {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Turns `/` into `\` and checks the path is drive-rooted.
///
/// # Errors
///
/// Returns `ValidationError::NotDriveRooted` otherwise.
pub fn normalize_folder(raw: &str) -> Result<String, ValidationError> {
    let folder = raw.trim().replace('/', "\\");
    if DRIVE_ROOTED.is_match(&folder) {
        Ok(folder)
    } else {
        Err(ValidationError::NotDriveRooted(folder))
    }
}

/// Base share name for a folder: its last component, or the drive letter for
/// a bare root.
#[must_use]
pub fn share_name_for(folder: &str) -> String {
    let trimmed = folder.trim_end_matches('\\');
    match trimmed.rsplit_once('\\') {
        Some((_, last)) if !last.is_empty() => last.to_string(),
        _ => trimmed.trim_end_matches(':').to_string(),
    }
}

fn non_empty(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(name)
    }
}

/// Escapes a value for a PowerShell double-quoted string.
///
/// PowerShell also treats the typographic quotes U+2018..U+201E as string
/// delimiters, so they get a backtick too.
fn ps_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '`' | '"' | '$' | '\u{2018}'..='\u{201E}') {
            out.push('`');
        }
        out.push(c);
    }
    out
}

fn share_script(folder: &str, name: &str, principal: &str) -> String {
    let folder = ps_escape(folder);
    let name = ps_escape(name);
    let principal = ps_escape(principal);
    format!(
        r#"function Generate-UniqueShareName([string]$ShareName) {{
    $ShareNameBase = $ShareName
    $Counter = 1
    while (Get-SmbShare -Name $ShareName -ErrorAction SilentlyContinue) {{
        $ShareName = "$ShareNameBase" + "_" + $Counter
        $Counter += 1
    }}
    return $ShareName
}}
$FolderPath = "{folder}"
$Principal = "{principal}"
$ExistingShare = Get-SmbShare -ErrorAction SilentlyContinue | Where-Object {{ $_.Path -eq $FolderPath }}
if ($ExistingShare) {{
    Write-Output "Folder is already shared."
}} else {{
    $Created = $false
    if (!(Test-Path -LiteralPath $FolderPath)) {{
        New-Item -ItemType Directory -Path $FolderPath | Out-Null
        $Created = $true
    }}
    $ShareName = Generate-UniqueShareName -ShareName "{name}"
    try {{
        New-SmbShare -Name $ShareName -Path $FolderPath -FullAccess $Principal -ErrorAction Stop | Out-Null
    }} catch {{
        Write-Output "FailedToShare: $($_.Exception.Message)"
        exit 1
    }}
    try {{
        $Acl = Get-Acl -LiteralPath $FolderPath
        $Rule = New-Object System.Security.AccessControl.FileSystemAccessRule($Principal, "FullControl", "ContainerInherit, ObjectInherit", "None", "Allow")
        $Acl.AddAccessRule($Rule)
        Set-Acl -LiteralPath $FolderPath -AclObject $Acl -ErrorAction Stop
    }} catch {{
        Write-Output "FailedToUpdateACL: $($_.Exception.Message)"
        exit 1
    }}
    if ($Created) {{ Write-Output "FolderCreatedAndShared" }} else {{ Write-Output "FolderShared" }}
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_drive_composes_net_use() {
        let req =
            CommandRequest::map_drive("10.0.0.5", "public", "z:", &CommandOptions::default())
                .unwrap();
        assert_eq!(req.intent(), Intent::MapDrive);
        assert_eq!(req.subject(), "Z:");
        assert_eq!(req.program(), "net");
        assert_eq!(req.args(), ["use", "Z:", r"\\10.0.0.5\public", "/persistent:yes"]);
        assert_eq!(req.to_string(), r#"net use Z: "\\10.0.0.5\public" /persistent:yes"#);
    }

    #[test]
    fn map_drive_honours_non_persistent_option() {
        let options = CommandOptions { persistent: false, ..CommandOptions::default() };
        let req = CommandRequest::map_drive("host", "data", "Y:", &options).unwrap();
        assert_eq!(req.args()[3], "/persistent:no");
    }

    #[test]
    fn map_drive_rejects_blank_fields() {
        let options = CommandOptions::default();
        assert_eq!(
            CommandRequest::map_drive("  ", "public", "Z:", &options),
            Err(ValidationError::EmptyAddress)
        );
        assert_eq!(
            CommandRequest::map_drive("10.0.0.5", "", "Z:", &options),
            Err(ValidationError::EmptyShare)
        );
        assert!(matches!(
            CommandRequest::map_drive("10.0.0.5", "public", "ZZ", &options),
            Err(ValidationError::InvalidDriveLetter(_))
        ));
    }

    #[test]
    fn share_folder_requires_drive_root() {
        let options = CommandOptions::default();
        assert!(matches!(
            CommandRequest::share_folder("data/shared", &options),
            Err(ValidationError::NotDriveRooted(_))
        ));
        assert!(matches!(
            CommandRequest::share_folder(r"\\server\share", &options),
            Err(ValidationError::NotDriveRooted(_))
        ));
    }

    #[test]
    fn share_folder_normalizes_slashes_and_embeds_path() {
        let req = CommandRequest::share_folder("C:/data/shared", &CommandOptions::default())
            .unwrap();
        assert_eq!(req.subject(), r"C:\data\shared");
        assert_eq!(req.program(), "powershell");
        let script = req.args().last().unwrap();
        assert!(script.contains(r#"$FolderPath = "C:\data\shared""#));
        assert!(script.contains(r#"-ShareName "shared""#));
        assert!(script.contains(r#"$Principal = "Everyone""#));
        assert!(req.to_string().ends_with("-Command <script>"));
    }

    #[test]
    fn share_script_escapes_powershell_metacharacters() {
        let req = CommandRequest::share_folder(r#"D:\$budget "q1""#, &CommandOptions::default())
            .unwrap();
        let script = req.args().last().unwrap();
        assert!(script.contains(r#"$FolderPath = "D:\`$budget `"q1`"""#));
    }

    #[test]
    fn share_script_escapes_typographic_quotes() {
        let folder = "C:\\a\u{201D}; Write-Output FolderShared; \u{201C}";
        let req = CommandRequest::share_folder(folder, &CommandOptions::default()).unwrap();
        let script = req.args().last().unwrap();
        assert!(script
            .contains("$FolderPath = \"C:\\a`\u{201D}; Write-Output FolderShared; `\u{201C}\""));

        let options = CommandOptions {
            principal: "Bob\u{2019}s \u{201E}team".into(),
            ..CommandOptions::default()
        };
        let req = CommandRequest::share_folder(r"C:\data", &options).unwrap();
        let script = req.args().last().unwrap();
        assert!(script.contains("$Principal = \"Bob`\u{2019}s `\u{201E}team\""));
    }

    #[test]
    fn share_name_uses_last_component_or_drive() {
        assert_eq!(share_name_for(r"C:\data\shared"), "shared");
        assert_eq!(share_name_for(r"C:\data\shared\"), "shared");
        assert_eq!(share_name_for(r"C:\"), "C");
    }

    #[test]
    fn removal_requests_use_net_delete() {
        let unshare = CommandRequest::unshare_folder("public").unwrap();
        assert_eq!(unshare.to_string(), "net share public /delete");
        let unmap = CommandRequest::unmap_drive(" Z: ").unwrap();
        assert_eq!(unmap.to_string(), "net use Z: /delete");
        assert_eq!(CommandRequest::unmap_drive(""), Err(ValidationError::EmptyName));
    }
}
