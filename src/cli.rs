//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `winnmt`.
#[derive(Debug, Parser)]
#[command(name = "winnmt", version, about = "Map network drives and share folders on Windows")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Map a remote share to a local drive letter.
    Map {
        /// Address of the remote host.
        #[arg(long)]
        ip: String,
        /// Share name on the remote host.
        #[arg(long)]
        share: String,
        /// Local drive letter, such as `Z:`.
        #[arg(long)]
        drive: String,
    },
    /// Share a local folder, creating it if needed.
    Share {
        /// Absolute folder path starting with a drive root.
        path: String,
    },
    /// Remove a share by name.
    Unshare {
        /// Share name as listed by `list`.
        name: String,
    },
    /// Disconnect a mapped drive.
    Unmap {
        /// Local device name, such as `Z:`.
        local_name: String,
    },
    /// List shares and mapped drives.
    List {
        /// Print JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// List drive letters that are free to map.
    Drives,
    /// Interactive session with stop support.
    Console,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_map_subcommand() {
        let cli =
            Cli::parse_from(["winnmt", "map", "--ip", "10.0.0.5", "--share", "public", "--drive", "Z:"]);
        match cli.command {
            Command::Map { ip, share, drive } => {
                assert_eq!(ip, "10.0.0.5");
                assert_eq!(share, "public");
                assert_eq!(drive, "Z:");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_share_path_with_spaces() {
        let cli = Cli::parse_from(["winnmt", "share", r"C:\Team Files"]);
        assert!(matches!(cli.command, Command::Share { path } if path == r"C:\Team Files"));
    }

    #[test]
    fn parses_list_json_flag() {
        let cli = Cli::parse_from(["winnmt", "list", "--json"]);
        assert!(matches!(cli.command, Command::List { json: true }));
    }

    #[test]
    fn map_requires_all_fields() {
        assert!(Cli::try_parse_from(["winnmt", "map", "--ip", "10.0.0.5"]).is_err());
    }
}
