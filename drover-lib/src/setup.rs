// SPDX-License-Identifier: GPL-2.0-only
use crate::agent::{self, ConfigureError};
use crate::command::{CommandError, CommandRunner};
use crate::net::{self, ReachabilityError};
use crate::os::{self, OsFamily};
use crate::package;
use crate::resolver;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Version argument value meaning "no explicit version requested".
/// The server-side bootstrap template leaves this token unexpanded when it
/// has no version to pin.
pub const VERSION_PLACEHOLDER: &str = "{agentVersion}";

/// Arguments for one bootstrap run, matching the CLI's positional order.
#[derive(Debug, Clone)]
pub struct SetupArgs {
    /// Hostname this node's agent should register as.
    pub agent_hostname: String,
    /// Shared secret for agent registration.
    pub passphrase: String,
    /// Controlling server hostname.
    pub server_hostname: String,
    /// Requested agent package version; may be empty, "null" or the
    /// placeholder token.
    pub requested_version: String,
    /// Controlling server port.
    pub server_port: u16,
}

/// Errors from the bootstrap pipeline. Every variant is terminal.
#[derive(Debug)]
pub enum SetupError {
    Unreachable(ReachabilityError),
    /// Version resolution produced an empty version.
    VersionNotFound { requested: String },
    /// The package-manager install command reported a non-zero status.
    InstallFailed { version: String, status: i32, output: String },
    Command(CommandError),
    Configure(ConfigureError),
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Unreachable(e) => write!(f, "{e}"),
            SetupError::VersionNotFound { requested } if requested.is_empty() => {
                write!(f, "no installable agent package version found")
            }
            SetupError::VersionNotFound { requested } => {
                write!(f, "no installable agent package version found for '{requested}'")
            }
            SetupError::InstallFailed { version, status, output } => {
                write!(f, "installing agent {version} failed with status {status}: {output}")
            }
            SetupError::Command(e) => write!(f, "{e}"),
            SetupError::Configure(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<ReachabilityError> for SetupError {
    fn from(e: ReachabilityError) -> Self {
        SetupError::Unreachable(e)
    }
}
impl From<CommandError> for SetupError {
    fn from(e: CommandError) -> Self {
        SetupError::Command(e)
    }
}
impl From<ConfigureError> for SetupError {
    fn from(e: ConfigureError) -> Self {
        SetupError::Configure(e)
    }
}

impl SetupError {
    /// Process exit status for this failure: install failures propagate
    /// the package manager's own status, everything else is the fixed
    /// failure code 1.
    pub fn exit_status(&self) -> i32 {
        match self {
            SetupError::InstallFailed { status, .. } => *status,
            _ => 1,
        }
    }
}

/// One-shot bootstrap pipeline: reachability check, OS detection, version
/// resolution, install, configure, launch. Strictly sequential, no retry.
pub struct Setup<'a> {
    runner: &'a dyn CommandRunner,
    release_file: PathBuf,
    config_file: PathBuf,
    grace: Duration,
}

impl<'a> Setup<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Setup {
            runner,
            release_file: PathBuf::from(os::RELEASE_FILE),
            config_file: PathBuf::from(agent::AGENT_CONFIG_FILE),
            grace: agent::REGISTRATION_GRACE,
        }
    }

    /// Override the release-identification file path.
    pub fn release_file(mut self, path: &Path) -> Self {
        self.release_file = path.to_path_buf();
        self
    }

    /// Override the agent configuration file path.
    pub fn config_file(mut self, path: &Path) -> Self {
        self.config_file = path.to_path_buf();
        self
    }

    /// Override the post-launch registration grace period.
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run the pipeline. `Ok` carries the launcher's exit status (0 when
    /// the agent came up); `Err` carries the first terminal failure.
    pub fn run(&self, args: &SetupArgs) -> Result<i32, SetupError> {
        net::check_server_reachability(&args.server_hostname, args.server_port)?;

        let requested = normalize_requested(&args.requested_version);
        let family = OsFamily::detect_from(&self.release_file);
        info!(family = %family, "detected OS family");

        let resolution = resolver::optimal_version(family, requested, self.runner)?;
        if resolution.version.is_empty() {
            return Err(SetupError::VersionNotFound { requested: requested.to_string() });
        }
        let version = resolution.version;

        if package::already_installed(family, &version, self.runner)? {
            info!(version = %version, "agent package already installed, skipping install");
        } else {
            let result = package::install_agent(family, &version, self.runner)?;
            if !result.success() {
                return Err(SetupError::InstallFailed {
                    version,
                    status: result.status,
                    output: result.output,
                });
            }
            info!(version = %version, "agent package installed");
        }

        agent::configure_agent(&args.server_hostname, &self.config_file)?;

        Ok(agent::run_agent_with_grace(
            &args.passphrase,
            &args.agent_hostname,
            self.runner,
            self.grace,
        ))
    }
}

/// The placeholder token and the literal "null" both mean "no explicit
/// version requested".
fn normalize_requested(requested: &str) -> &str {
    if requested == VERSION_PLACEHOLDER || requested == "null" {
        ""
    } else {
        requested
    }
}
