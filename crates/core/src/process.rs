//! Process execution utilities
//!
//! Provides a unified interface for running external commands with:
//! - Output capture
//! - Directory context
//! - Streaming output

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from std::process::Output
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::command_not_found(program).with_source(err)
    } else {
        Error::process(format!("Failed to execute {}: {}", program, err)).with_source(err)
    }
}

/// Run a command and capture output
pub fn run_command(program: &str, args: &[&str]) -> Result<CommandResult> {
    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandResult::from_output(output))
}

/// Run a command and stream its output to the terminal.
///
/// `dir` sets the working directory of the child only; the current process
/// directory is never changed.
pub fn run_command_streaming_in_dir<S: AsRef<str>>(
    program: &str,
    args: &[S],
    dir: Option<&Path>,
) -> Result<i32> {
    let mut cmd = Command::new(program);
    for arg in args {
        cmd.arg(AsRef::<str>::as_ref(arg));
    }
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let status = cmd.status().map_err(|e| spawn_error(program, e))?;

    // Signals leave no exit code; report them as a generic failure.
    Ok(status.code().unwrap_or(-1))
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_command_exists_sh() {
        assert!(command_exists("sh"));
    }

    #[test]
    fn test_command_exists_nonexistent() {
        assert!(!command_exists("nonexistent_command_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_echo() {
        let result = run_command("echo", &["hello"]).unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn test_run_missing_program_is_command_not_found() {
        let err = run_command("nonexistent_command_12345", &[]).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CommandNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_streaming_reports_exit_code() {
        let code = run_command_streaming_in_dir("sh", &["-c", "exit 3"], None).unwrap();
        assert_eq!(code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_streaming_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let code = run_command_streaming_in_dir("sh", &["-c", "touch marker"], Some(dir.path()))
            .unwrap();

        assert_eq!(code, 0);
        assert!(dir.path().join("marker").exists());
    }
}
