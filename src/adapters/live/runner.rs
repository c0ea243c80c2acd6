//! Live command runner using `std::process::Command`.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::error::LaunchError;
use crate::ports::runner::{CancelToken, CommandResult, CommandRunner, RunError};
use crate::request::CommandRequest;

const DEFAULT_POLL: Duration = Duration::from_millis(25);

/// Spawns the requested program directly, without a shell.
pub struct LiveCommandRunner {
    poll_interval: Duration,
}

impl LiveCommandRunner {
    /// Creates a runner that checks for exit and cancellation every 25ms.
    #[must_use]
    pub fn new() -> Self {
        Self { poll_interval: DEFAULT_POLL }
    }
}

impl Default for LiveCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for LiveCommandRunner {
    fn run(&self, request: &CommandRequest, cancel: &CancelToken) -> Result<CommandResult, RunError> {
        let mut command = Command::new(request.program());
        command
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console(&mut command);

        let mut child =
            command.spawn().map_err(|e| LaunchError::new(request.program(), e))?;
        debug!(pid = child.id(), command = %request, "spawned");

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                debug!(command = %request, "killed after cancellation");
                return Err(RunError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(LaunchError::new(request.program(), e).into());
                }
            }
        };

        // Processes the command left behind can hold the pipes open after it
        // exits, so cancellation is still honoured while the readers drain.
        while !(stdout.is_finished() && stderr.is_finished()) {
            if cancel.is_cancelled() {
                debug!(command = %request, "cancelled while draining output");
                return Err(RunError::Cancelled);
            }
            thread::sleep(self.poll_interval);
        }
        let mut output = stdout.join().unwrap_or_default();
        output.push_str(&stderr.join().unwrap_or_default());
        Ok(CommandResult { output, exit_code: status.code().unwrap_or(-1) })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        decode(buf)
    })
}

/// Turns captured bytes into text. `net` and PowerShell write in the OEM
/// code page when they have no console, so non-UTF-8 output is decoded
/// with it on Windows.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        #[cfg(windows)]
        Err(err) => oem::decode(err.as_bytes()),
        #[cfg(not(windows))]
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
mod oem {
    use windows::Win32::Globalization::{
        GetOEMCP, MultiByteToWideChar, MULTI_BYTE_TO_WIDE_CHAR_FLAGS,
    };

    pub(super) fn decode(bytes: &[u8]) -> String {
        // SAFETY: GetOEMCP has no preconditions.
        let codepage = unsafe { GetOEMCP() };
        decode_with(codepage, bytes)
    }

    pub(super) fn decode_with(codepage: u32, bytes: &[u8]) -> String {
        let flags = MULTI_BYTE_TO_WIDE_CHAR_FLAGS(0);
        // SAFETY: the input slice is valid and no output buffer is passed.
        let len = unsafe { MultiByteToWideChar(codepage, flags, bytes, None) };
        let Ok(len) = usize::try_from(len) else {
            return String::from_utf8_lossy(bytes).into_owned();
        };
        if len == 0 {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        let mut wide = vec![0u16; len];
        // SAFETY: `wide` holds exactly the length the sizing call reported.
        let written = unsafe { MultiByteToWideChar(codepage, flags, bytes, Some(&mut wide)) };
        let written = usize::try_from(written).unwrap_or(0);
        String::from_utf16_lossy(&wide[..written.min(len)])
    }
}

#[cfg(windows)]
fn hide_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_command: &mut Command) {}
