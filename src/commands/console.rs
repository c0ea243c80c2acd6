//! `winnmt console`: an interactive session.
//!
//! Stdin is read on its own thread and fed into the session's event channel,
//! so a running mapping can be stopped while the loop keeps handling input.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::Sender;
use std::thread;

use clap::{Parser, Subcommand};

use super::list::print_tables;
use crate::session::{Event, Session};

/// One line typed at the console prompt.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_subcommand = true, disable_help_flag = true)]
struct Line {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Debug, Subcommand)]
enum LineCommand {
    /// map <ip> <share> [drive]
    Map { ip: String, share: String, drive: Option<String> },
    /// share <path>. The path is taken from the raw line.
    Share {
        #[arg(value_name = "PATH", required = true, num_args = 1.., trailing_var_arg = true)]
        _path: Vec<String>,
    },
    /// Stop the running mapping.
    Stop,
    /// unshare <name>
    Unshare { name: String },
    /// unmap <drive>
    Unmap { local_name: String },
    /// Show shares and mapped drives.
    List,
    /// Show free drive letters.
    Drives,
    /// Clear the log.
    Clear,
    /// Show commands.
    Help,
    /// Leave the console.
    #[command(alias = "exit")]
    Quit,
}

const HELP: &str = "\
Commands:
  map <ip> <share> [drive]   map a network drive (drive defaults to the first free letter)
  share <path>               share a folder, creating it if needed
  stop                       stop the running mapping
  unshare <name>             remove a share
  unmap <drive>              disconnect a mapped drive
  list                       show shares and mapped drives
  drives                     show free drive letters
  clear                      clear the log
  help                       show this text
  quit                       leave";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Execute the `console` command.
///
/// # Errors
///
/// Returns an error string if the input thread cannot be started.
pub fn run(session: &mut Session) -> Result<(), String> {
    spawn_reader(session.sender())?;
    let _ = session.refresh();
    println!("{HELP}");
    let mut printed = flush_log(session, 0);
    prompt();

    while let Some(event) = session.next_event(None) {
        let flow = match event {
            Event::Worker(event) => {
                let _ = session.apply(event);
                Flow::Continue
            }
            Event::Input(line) => {
                let flow = handle_line(session, &line);
                printed = flush_log(session, printed);
                prompt();
                flow
            }
            Event::InputClosed => Flow::Quit,
        };
        printed = flush_log(session, printed);
        if flow == Flow::Quit {
            break;
        }
    }

    if session.stop_mapping() {
        flush_log(session, printed);
    }
    Ok(())
}

fn spawn_reader(tx: Sender<Event>) -> Result<(), String> {
    thread::Builder::new()
        .name("winnmt-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(Event::Input(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::InputClosed);
        })
        .map(|_| ())
        .map_err(|err| format!("failed to start input thread: {err}"))
}

fn handle_line(session: &mut Session, line: &str) -> Flow {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Flow::Continue;
    }
    let command = match Line::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(err) => {
            println!("{}", err.render());
            return Flow::Continue;
        }
    };

    // Start and removal errors are already in the session log.
    match command {
        LineCommand::Map { ip, share, drive } => {
            let drive = drive.unwrap_or_else(|| session.form().drive_letter.clone());
            let _ = session.map_drive(&ip, &share, &drive);
        }
        LineCommand::Share { .. } => {
            let _ = session.share_folder(rest_of_line(line));
        }
        LineCommand::Stop => {
            if !session.stop_mapping() {
                println!("No mapping is running.");
            }
        }
        LineCommand::Unshare { name } => {
            let _ = session.unshare(&name);
        }
        LineCommand::Unmap { local_name } => {
            let _ = session.unmap(&local_name);
        }
        LineCommand::List => {
            let _ = session.refresh();
            print_tables(session);
        }
        LineCommand::Drives => {
            let _ = session.refresh();
            println!("{}", session.free_letters().join(" "));
        }
        LineCommand::Clear => session.clear_log(),
        LineCommand::Help => println!("{HELP}"),
        LineCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Everything after the first word, with inner spacing kept.
fn rest_of_line(line: &str) -> &str {
    let line = line.trim();
    line.find(char::is_whitespace).map_or("", |at| line[at..].trim())
}

/// Prints log lines past `printed`; returns the new count.
fn flush_log(session: &Session, printed: usize) -> usize {
    let log = session.log();
    for entry in log.iter().skip(printed) {
        println!("{entry}");
    }
    log.len()
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
