//! Shell command execution for filter steps.

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of piping content through a shell command.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output, unmodified.
    pub stdout: Vec<u8>,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Run `command` through the platform shell with `input` on stdin.
///
/// Stdin is fed from a separate thread so commands that interleave
/// reading and writing cannot deadlock on full pipes.
pub fn run_filter(command: &str, input: &[u8], cwd: Option<&Path>) -> Result<FilterOutput> {
    let start = Instant::now();

    let mut cmd = Command::new(detect_shell());
    cmd.arg(shell_flag());
    cmd.arg(command);

    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || {
            // A command that ignores stdin closes the pipe early; that is fine.
            let _ = stdin.write_all(&input);
        })
    });

    let output = child.wait_with_output()?;

    if let Some(handle) = writer {
        let _ = handle.join();
    }

    let duration = start.elapsed();
    tracing::debug!(
        command,
        exit_code = ?output.status.code(),
        elapsed_ms = duration.as_millis() as u64,
        "filter command finished"
    );

    Ok(FilterOutput {
        exit_code: output.status.code(),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration,
        success: output.status.success(),
    })
}

/// Shell used for filter commands.
fn detect_shell() -> String {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        "/bin/sh".to_string()
    }
}

/// Flag passing a command string to the shell.
fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}
