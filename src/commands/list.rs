//! `winnmt list` command.

use serde_json::json;

use crate::session::Session;

/// Execute the `list` command.
///
/// Prints the share table and the mapped-drive table, or both as one JSON
/// document with `--json`.
///
/// # Errors
///
/// Returns an error string if either table could not be read.
pub fn run(session: &mut Session, as_json: bool) -> Result<(), String> {
    let start = session.log().len();
    if !session.refresh() {
        super::print_log(session, start);
        return Err("could not read the share and connection tables".into());
    }

    if as_json {
        let doc = json!({
            "shares": session.shares(),
            "mapped_drives": session.mapped_drives(),
        });
        let text = serde_json::to_string_pretty(&doc).map_err(|err| err.to_string())?;
        println!("{text}");
    } else {
        print_tables(session);
    }
    Ok(())
}

/// Prints shares and mapped drives as aligned tables.
pub fn print_tables(session: &Session) {
    let shares: Vec<(&str, &str)> =
        session.shares().iter().map(|s| (s.name.as_str(), s.local_path.as_str())).collect();
    if shares.is_empty() {
        println!("No shares found.");
    } else {
        print_table(("SHARE", "PATH"), &shares);
        println!("\n{} share(s) total.", shares.len());
    }
    println!();

    let drives: Vec<(&str, &str)> = session
        .mapped_drives()
        .iter()
        .map(|d| (d.local_name.as_str(), d.remote_name.as_str()))
        .collect();
    if drives.is_empty() {
        println!("No mapped drives found.");
    } else {
        print_table(("LOCAL", "REMOTE"), &drives);
        println!("\n{} mapped drive(s) total.", drives.len());
    }
}

fn print_table(header: (&str, &str), rows: &[(&str, &str)]) {
    let left = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(header.0.len());
    let right = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(header.1.len());

    println!("{:<left$}  {:<right$}", header.0, header.1);
    println!("{:-<left$}  {:-<right$}", "", "");
    for (a, b) in rows {
        println!("{a:<left$}  {b:<right$}");
    }
}
