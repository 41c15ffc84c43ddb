// SPDX-License-Identifier: GPL-2.0-only
use std::process::Command;
use tracing::debug;

/// Outcome of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit status of the command (-1 if it was killed by a signal).
    pub status: i32,
    /// Captured stdout, with stderr appended when non-empty.
    pub output: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// First line of the output, trimmed. Empty output yields "".
    pub fn first_line(&self) -> &str {
        self.output.lines().next().unwrap_or("").trim()
    }
}

/// Errors from running external commands.
#[derive(Debug)]
pub enum CommandError {
    /// The command could not be started at all (shell missing, spawn failure).
    Spawn { command: String, source: std::io::Error },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn { command, source } => {
                write!(f, "cannot run '{command}': {source}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Seam for all external command execution.
///
/// Package-manager queries, installs and agent launches go through this
/// trait so they can be scripted in tests without real OS dependencies.
pub trait CommandRunner: Send + Sync {
    /// Run a shell command with extra environment variables set.
    fn run_with_env(
        &self,
        command: &str,
        env: &[(&str, &str)],
    ) -> Result<CommandResult, CommandError>;

    /// Run a shell command with the inherited environment.
    fn run(&self, command: &str) -> Result<CommandResult, CommandError> {
        self.run_with_env(command, &[])
    }
}

/// Real runner: executes commands through `sh -c` and captures output.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run_with_env(
        &self,
        command: &str,
        env: &[(&str, &str)],
    ) -> Result<CommandResult, CommandError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| CommandError::Spawn {
            command: command.to_string(),
            source: e,
        })?;

        let status = output.status.code().unwrap_or(-1);
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        debug!(command, status, "external command finished");
        Ok(CommandResult { status, output: text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_runner_captures_stdout_and_status() {
        let result = ShellRunner.run("echo hello").unwrap();
        assert_eq!(result.status, 0);
        assert!(result.success());
        assert_eq!(result.first_line(), "hello");
    }

    #[test]
    fn shell_runner_reports_nonzero_status() {
        let result = ShellRunner.run("exit 3").unwrap();
        assert_eq!(result.status, 3);
        assert!(!result.success());
    }

    #[test]
    fn shell_runner_captures_stderr() {
        let result = ShellRunner.run("echo oops >&2; exit 1").unwrap();
        assert_eq!(result.status, 1);
        assert!(result.output.contains("oops"));
    }

    #[test]
    fn shell_runner_passes_environment() {
        let result = ShellRunner
            .run_with_env("echo \"$DROVER_TEST_VAR\"", &[("DROVER_TEST_VAR", "marker")])
            .unwrap();
        assert_eq!(result.first_line(), "marker");
    }

    #[test]
    fn first_line_of_empty_output_is_empty() {
        let result = CommandResult { status: 0, output: String::new() };
        assert_eq!(result.first_line(), "");
    }
}
