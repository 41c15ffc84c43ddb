// SPDX-License-Identifier: GPL-2.0-only
use crate::command::CommandRunner;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Agent configuration file written by the configurator.
pub const AGENT_CONFIG_FILE: &str = "/etc/drover-agent/agent.conf";

/// Command used to start and probe the agent. Resolved through PATH.
pub const AGENT_COMMAND: &str = "drover-agent";

/// Environment variable carrying the registration secret to the agent.
pub const PASSPHRASE_ENV: &str = "DROVER_PASSPHRASE";

/// Grace period between starting the agent and probing its status, giving
/// it time to register with the server.
pub const REGISTRATION_GRACE: Duration = Duration::from_secs(3);

/// Errors from writing the agent configuration.
#[derive(Debug)]
pub enum ConfigureError {
    Io { path: String, source: std::io::Error },
}

impl std::fmt::Display for ConfigureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigureError::Io { path, source } => {
                write!(f, "cannot write agent config {path}: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigureError {}

/// Write the controlling server's hostname into the agent configuration.
/// Overwrites any existing file; no merge, no backup.
pub fn configure_agent(server_hostname: &str, path: &Path) -> Result<(), ConfigureError> {
    let io_err = |source| ConfigureError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, format!("hostname={server_hostname}\n")).map_err(io_err)?;
    info!(server = server_hostname, config = %path.display(), "agent configured");
    Ok(())
}

/// Start the agent and report how the launch went.
///
/// The secret travels via `DROVER_PASSPHRASE`, never on the command line.
/// After the registration grace period the agent is probed with `status`;
/// the probe decides the return value: 1 if the probe could not be run at
/// all, the probe's own exit status if non-zero, 0 otherwise. The start
/// command's status is only logged.
pub fn run_agent(passphrase: &str, expected_hostname: &str, runner: &dyn CommandRunner) -> i32 {
    run_agent_with_grace(passphrase, expected_hostname, runner, REGISTRATION_GRACE)
}

pub fn run_agent_with_grace(
    passphrase: &str,
    expected_hostname: &str,
    runner: &dyn CommandRunner,
    grace: Duration,
) -> i32 {
    let start = format!("{AGENT_COMMAND} restart --expected-hostname={expected_hostname}");
    match runner.run_with_env(&start, &[(PASSPHRASE_ENV, passphrase)]) {
        Ok(result) if !result.success() => {
            warn!(status = result.status, output = %result.output, "agent start reported failure");
        }
        Ok(_) => info!(hostname = expected_hostname, "agent started"),
        Err(e) => warn!(error = %e, "agent start command could not be run"),
    }

    std::thread::sleep(grace);

    match runner.run(&format!("{AGENT_COMMAND} status")) {
        Err(e) => {
            warn!(error = %e, "agent status probe could not be run");
            1
        }
        Ok(result) if !result.success() => {
            warn!(status = result.status, output = %result.output, "agent is not running");
            result.status
        }
        Ok(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;

    #[test]
    fn configure_writes_server_hostname() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("conf").join("agent.conf");
        configure_agent("server.example.com", &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hostname=server.example.com\n");
    }

    #[test]
    fn configure_overwrites_without_backup() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent.conf");
        std::fs::write(&path, "hostname=old.example.com\nextra=1\n").unwrap();
        configure_agent("new.example.com", &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "hostname=new.example.com\n"
        );
        assert!(!tmp.path().join("agent.conf.bak").exists());
    }

    #[test]
    fn configure_fails_on_unwritable_path() {
        let err = configure_agent("server", Path::new("/proc/no-such/agent.conf"));
        assert!(err.is_err());
    }

    #[test]
    fn run_agent_success_returns_zero() {
        let runner = ScriptedRunner::new()
            .on("restart", 0, "")
            .on("status", 0, "drover-agent running");
        let ret = run_agent_with_grace("secret", "node1.example.com", &runner, Duration::ZERO);
        assert_eq!(ret, 0);
        assert!(runner.calls()[0].contains("--expected-hostname=node1.example.com"));
    }

    #[test]
    fn run_agent_propagates_probe_status() {
        let runner = ScriptedRunner::new()
            .on("restart", 0, "")
            .on("status", 2, "agent dead");
        let ret = run_agent_with_grace("secret", "node1", &runner, Duration::ZERO);
        assert_eq!(ret, 2);
    }

    #[test]
    fn run_agent_returns_one_when_probe_cannot_run() {
        let runner = ScriptedRunner::new()
            .on("restart", 0, "")
            .fail_on("status");
        let ret = run_agent_with_grace("secret", "node1", &runner, Duration::ZERO);
        assert_eq!(ret, 1);
    }

    #[test]
    fn run_agent_probes_even_when_start_fails() {
        let runner = ScriptedRunner::new()
            .fail_on("restart")
            .on("status", 0, "running");
        let ret = run_agent_with_grace("secret", "node1", &runner, Duration::ZERO);
        assert_eq!(ret, 0);
        assert_eq!(runner.calls().len(), 2);
    }
}
