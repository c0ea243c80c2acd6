//! Integration tests for top-level CLI behavior.
//!
//! Every run uses the simulated host so the tests pass on any platform.

use std::process::Command;

fn run_winnmt(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_winnmt");
    Command::new(bin)
        .args(args)
        .env("WINNMT_SIMULATE", "1")
        .env_remove("WINNMT_RECORD")
        .env_remove("WINNMT_REPLAY")
        .output()
        .expect("failed to run winnmt binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_winnmt(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for name in ["map", "share", "unshare", "unmap", "list", "drives", "console"] {
        assert!(stdout.contains(name), "missing {name} in help");
    }
}

#[test]
fn version_prints_to_stdout() {
    let output = run_winnmt(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("winnmt "));
    assert!(output.stderr.is_empty());
}

#[test]
fn map_prints_timestamped_log() {
    let output = run_winnmt(&["map", "--ip", "10.0.0.5", "--share", "public", "--drive", "Z:"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(": Mapping network drive..."));
    assert!(stdout.contains(": Network drive mapped successfully."));
}

#[test]
fn map_onto_local_volume_fails() {
    let output = run_winnmt(&["map", "--ip", "10.0.0.5", "--share", "public", "--drive", "C:"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stdout.contains("The local device name is already in use."));
    assert!(stderr.contains("could not map network drive"));
}

#[test]
fn map_with_bad_drive_letter_is_rejected() {
    let output = run_winnmt(&["map", "--ip", "10.0.0.5", "--share", "public", "--drive", "ZZ"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("valid drive letter"));
    assert!(!stdout.contains("Mapping network drive..."));
}

#[test]
fn share_relative_path_is_rejected() {
    let output = run_winnmt(&["share", "data"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("Please enter a valid directory path with a root drive."));
}

#[test]
fn share_new_folder_succeeds() {
    let output = run_winnmt(&["share", r"C:\Team Files"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Folder created and shared successfully."));
}

#[test]
fn list_hides_ipc_share() {
    let output = run_winnmt(&["list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("ADMIN$"));
    assert!(!stdout.contains("IPC$"));
    assert!(stdout.contains("No mapped drives found."));
}

#[test]
fn list_json_is_parseable() {
    let output = run_winnmt(&["list", "--json"]);
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["shares"].as_array().unwrap().iter().any(|s| s["name"] == "C$"));
    assert!(doc["mapped_drives"].as_array().unwrap().is_empty());
}

#[test]
fn drives_skip_local_volume() {
    let output = run_winnmt(&["drives"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Z:"));
    assert!(!stdout.split_whitespace().any(|letter| letter == "C:"));
}

#[test]
fn unmap_unknown_drive_fails() {
    let output = run_winnmt(&["unmap", "Q:"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("The network connection could not be found."));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = run_winnmt(&["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn invalid_classify_mode_is_reported() {
    let bin = env!("CARGO_BIN_EXE_winnmt");
    let output = Command::new(bin)
        .arg("list")
        .env("WINNMT_SIMULATE", "1")
        .env("WINNMT_CLASSIFY", "fuzzy")
        .output()
        .expect("failed to run winnmt binary");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("WINNMT_CLASSIFY"));
}
