// SPDX-License-Identifier: GPL-2.0-only
use crate::command::{CommandError, CommandResult, CommandRunner};
use std::sync::Mutex;

enum Response {
    Result(CommandResult),
    SpawnError,
}

/// Scripted stand-in for `ShellRunner`.
///
/// Rules are matched by substring against the command text, first match
/// wins. An unscripted command panics so tests cannot silently run more
/// commands than they declared. Records every command it was asked to run.
pub struct ScriptedRunner {
    rules: Vec<(String, Response)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        ScriptedRunner { rules: Vec::new(), calls: Mutex::new(Vec::new()) }
    }

    /// Commands containing `needle` return the given status and output.
    pub fn on(mut self, needle: &str, status: i32, output: &str) -> Self {
        self.rules.push((
            needle.to_string(),
            Response::Result(CommandResult { status, output: output.to_string() }),
        ));
        self
    }

    /// Commands containing `needle` fail to spawn entirely.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Response::SpawnError));
        self
    }

    /// All commands run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run_with_env(
        &self,
        command: &str,
        _env: &[(&str, &str)],
    ) -> Result<CommandResult, CommandError> {
        self.calls.lock().unwrap().push(command.to_string());
        for (needle, response) in &self.rules {
            if command.contains(needle.as_str()) {
                return match response {
                    Response::Result(result) => Ok(result.clone()),
                    Response::SpawnError => Err(CommandError::Spawn {
                        command: command.to_string(),
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    }),
                };
            }
        }
        panic!("unscripted command: {command}");
    }
}
